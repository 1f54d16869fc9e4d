//! Error type for Azure DevOps operations.

use client::ClientError;
use thiserror::Error;

/// Errors returned by [`crate::AzureDevOpsClient`] operations.
#[derive(Debug, Error)]
pub enum AzureDevOpsError {
    /// The call did not produce a usable response.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The organisation base URL could not be parsed or extended.
    #[error("Invalid Azure DevOps URL '{url}': {message}")]
    InvalidUrl {
        /// The URL as configured.
        url: String,
        /// Parser message.
        message: String,
    },

    /// Azure DevOps answered with a status the operation does not accept.
    #[error("Failed to {action} {target}: {status} {body}")]
    UnexpectedStatus {
        /// What was being attempted (e.g. `"fetch repositories for project"`).
        action: &'static str,
        /// The project or repository the action applied to.
        target: String,
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Failed to decode response to {action} {target}: {message}")]
    Decode {
        action: &'static str,
        target: String,
        message: String,
    },
}

impl AzureDevOpsError {
    /// HTTP status of an [`AzureDevOpsError::UnexpectedStatus`], if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            AzureDevOpsError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
