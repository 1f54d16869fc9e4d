//! Core domain for repo-admin.
//!
//! This crate contains every identifier, shared value type, and cross-cutting
//! error type used by the API adapters and the CLI, together with the two pieces
//! of pure logic shared by every bulk operation: batch partitioning and the
//! retry budget that bounds rate-limit and conflict retries.
//!
//! ## Architectural Layer
//!
//! **Business logic.** This crate performs no network or file I/O. Environment
//! lookup in [`config`] goes through an injectable function.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OwnerName`, `Topic`, `GitHubRepositoryId`, etc.) |
//! | [`types`] | Shared value types (`ApiTimeout`, `BatchSize`, `Credential`, `Timestamp`, etc.) |
//! | [`retry`] | `RateLimitState` and `RetryBudget` |
//! | [`batch`] | `BatchPartitioner` and its `Batch` iterator |
//! | [`config`] | `ConfigResolver` |
//! | [`errors`] | `ConfigError` and `LookupError` |

pub mod batch;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod retry;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use batch::{Batch, BatchPartitioner, Batches};
pub use config::{ConfigResolver, API_TIMEOUT_SECONDS_VAR, BATCH_SIZE_VAR};
pub use errors::{ConfigError, LookupError};
pub use identifiers::{
    AzureDevOpsId, ConfigurationName, GitHubRepositoryId, OrganizationName, OwnerName,
    ProjectName, RepositoryName, RepositoryRef, RunId, SecurityConfigurationId, Topic,
};
pub use retry::{
    RateLimitState, RetryBudget, INITIAL_CONFLICT_BACKOFF, MAX_CONFLICT_BACKOFF,
    RATE_LIMIT_RESET_BUFFER,
};
pub use types::{language_for_path, ApiTimeout, BatchSize, Credential, LastCommit, Timestamp};
