//! Error types for the rate-limited client.

use std::time::Duration;

use thiserror::Error;

/// A request could not be delivered or its response could not be read.
///
/// Transport failures are not retried by the client.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {message}")]
    Build {
        /// Description of the failure.
        message: String,
    },

    /// The request could not be sent or no response was received.
    #[error("Request to {url} failed: {message}")]
    Send {
        /// Target URL.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The response body could not be read.
    #[error("Failed to read response body from {url}: {message}")]
    Body {
        /// Target URL.
        url: String,
        /// Description of the failure.
        message: String,
    },
}

/// Errors returned by [`crate::RateLimitedClient::execute`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The rate-limit window did not reset within the retry budget.
    #[error(
        "Rate limit still exhausted for {url} after {elapsed:?} ({attempts} attempts, timeout {timeout:?})"
    )]
    RateLimitTimeout {
        /// Target URL.
        url: String,
        /// Time spent on the call, retries included.
        elapsed: Duration,
        /// Configured timeout.
        timeout: Duration,
        /// Number of times the request was sent.
        attempts: u32,
    },

    /// A write kept conflicting past the retry budget.
    #[error("Conflict persisted for {url} after {elapsed:?} ({attempts} attempts, timeout {timeout:?})")]
    ConflictTimeout {
        /// Target URL.
        url: String,
        /// Time spent on the call, retries included.
        elapsed: Duration,
        /// Configured timeout.
        timeout: Duration,
        /// Number of times the request was sent.
        attempts: u32,
    },

    /// A header value could not be encoded.
    #[error("Invalid value for header '{name}'")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// `true` for the two timeout variants.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ClientError::RateLimitTimeout { .. } | ClientError::ConflictTimeout { .. }
        )
    }
}
