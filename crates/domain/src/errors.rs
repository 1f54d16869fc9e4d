//! Cross-cutting error types for the repo-admin domain.
//!
//! [`ConfigError`] covers settings that must be present before any remote call
//! is made. [`LookupError`] covers named remote entities that could not be found.
//! Transport and API-level failures are defined in the infrastructure crates.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A required setting could not be resolved.
///
/// Configuration errors are fatal: they are reported immediately and never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("Required environment variable '{name}' is not set")]
    MissingConfiguration {
        /// Name of the environment variable.
        name: String,
    },
}

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

/// A named entity was not present among the results returned by an API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No entity of kind `entity` carries the identifying `key`.
    #[error("{entity} '{key}' was not found")]
    NotFound {
        /// Human-readable entity kind (e.g. `"Code security configuration"`).
        entity: &'static str,
        /// The name or id that was searched for.
        key: String,
    },
}
