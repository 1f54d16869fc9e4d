//! repo-admin Azure DevOps infrastructure adapter.
//!
//! [`AzureDevOpsClient`] addresses one organisation on `dev.azure.com` and
//! sends every call through the shared [`client::RateLimitedClient`].
//!
//! | Module | Operations |
//! |--------|------------|
//! | [`projects`] | Organisation projects and the repositories of a project |
//! | [`repositories`] | Repository details, last commit, item tree, languages, pipeline files |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL construction (including the `api-version` query
//! parameter), authentication and response envelopes live here.

mod errors;
pub mod projects;
pub mod repositories;
mod rest;

pub use errors::AzureDevOpsError;
pub use projects::{Project, Repository};
pub use repositories::{RepositoryItem, PIPELINE_FILE_EXTENSION};
pub use rest::{AzureDevOpsClient, API_VERSION, DEFAULT_HOST};
