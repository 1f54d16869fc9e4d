//! Error type for GitHub operations.

use client::ClientError;
use domain::LookupError;
use thiserror::Error;

/// Errors returned by [`crate::GitHubClient`] operations.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The call did not produce a usable response (transport failure or
    /// retry budget exhausted).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// GitHub answered with a status the operation does not accept.
    #[error("Failed to {action} {target}: {status}, {body}")]
    UnexpectedStatus {
        /// What was being attempted (e.g. `"fetch topics for"`).
        action: &'static str,
        /// The repository or organisation the action applied to.
        target: String,
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Failed to decode response to {action} {target}: {message}")]
    Decode {
        /// What was being attempted.
        action: &'static str,
        /// The repository or organisation the action applied to.
        target: String,
        /// Deserializer message.
        message: String,
    },

    /// A named entity was not among the results.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl GitHubError {
    /// HTTP status of an [`GitHubError::UnexpectedStatus`], if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
