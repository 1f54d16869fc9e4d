//! repo-admin GitHub infrastructure adapter.
//!
//! [`GitHubClient`] issues every GitHub REST call through the shared
//! [`client::RateLimitedClient`], so rate-limit waits and conflict back-off
//! are handled below this crate. Operations are grouped by concern:
//!
//! | Module | Operations |
//! |--------|------------|
//! | [`topics`] | Read, replace, and additively merge repository topics |
//! | [`security`] | Look up and attach code security configurations |
//! | [`repositories`] | Organisation listing, details, last commit, languages |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request paths, authentication headers and response
//! shapes live here; callers see domain types only.

mod errors;
pub mod repositories;
mod rest;
pub mod security;
pub mod topics;

pub use errors::GitHubError;
pub use repositories::{RepositoryDetails, RepositorySummary};
pub use rest::{GitHubClient, API_VERSION, DEFAULT_API_BASE_URL};
pub use security::CodeSecurityConfiguration;
pub use topics::{merge_topics, parse_topic_list, TopicChange};
