//! Per-repository reads: details, newest commit, and the item tree.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{instrument, warn};

use domain::{language_for_path, AzureDevOpsId, LastCommit, ProjectName};

use crate::rest::{decode, ValueList};
use crate::{AzureDevOpsClient, AzureDevOpsError, Repository};

/// Extension identifying pipeline definition files.
pub const PIPELINE_FILE_EXTENSION: &str = ".yml";

/// One entry of a repository's item tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryItem {
    pub path: String,
    #[serde(default, rename = "isFolder")]
    pub is_folder: bool,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    committer: Option<GitUserDate>,
}

#[derive(Debug, Deserialize)]
struct GitUserDate {
    date: Option<String>,
}

fn target(project: &ProjectName, repository: &AzureDevOpsId) -> String {
    format!("{project}/{repository}")
}

impl AzureDevOpsClient {
    /// Fetches a single repository, including its size.
    #[instrument(skip(self), fields(project = %project, repository = %repository))]
    pub async fn repository(
        &self,
        project: &ProjectName,
        repository: &AzureDevOpsId,
    ) -> Result<Repository, AzureDevOpsError> {
        let request = self.get(
            &[project.as_str(), "_apis", "git", "repositories", repository.as_str()],
            &[],
        )?;
        let response = self.send(request).await?;
        decode("fetch details for repository", &target(project, repository), &response)
    }

    /// The committer date of the newest commit.
    ///
    /// An empty history yields [`LastCommit::NoCommits`]; any failure status
    /// yields [`LastCommit::Unavailable`].
    #[instrument(skip(self), fields(project = %project, repository = %repository))]
    pub async fn last_commit(
        &self,
        project: &ProjectName,
        repository: &AzureDevOpsId,
    ) -> Result<LastCommit, AzureDevOpsError> {
        let request = self.get(
            &[project.as_str(), "_apis", "git", "repositories", repository.as_str(), "commits"],
            &[("$top", "1")],
        )?;
        let response = self.send(request).await?;
        if !response.is_success() {
            warn!(status = response.status().as_u16(), "Failed to fetch commits");
            return Ok(LastCommit::Unavailable);
        }

        match response.json::<ValueList<CommitRef>>() {
            Ok(list) => Ok(list
                .value
                .into_iter()
                .next()
                .map(|commit| {
                    commit
                        .committer
                        .and_then(|c| c.date)
                        .map_or(LastCommit::Unavailable, LastCommit::Date)
                })
                .unwrap_or(LastCommit::NoCommits)),
            Err(e) => {
                warn!(error = %e, "Unexpected commit listing");
                Ok(LastCommit::Unavailable)
            }
        }
    }

    /// Lists every item of the repository's default branch, recursively.
    #[instrument(skip(self), fields(project = %project, repository = %repository))]
    pub async fn items(
        &self,
        project: &ProjectName,
        repository: &AzureDevOpsId,
    ) -> Result<Vec<RepositoryItem>, AzureDevOpsError> {
        let request = self.get(
            &[project.as_str(), "_apis", "git", "repositories", repository.as_str(), "items"],
            &[("scopePath", "/"), ("recursionLevel", "full")],
        )?;
        let response = self.send(request).await?;
        let list: ValueList<RepositoryItem> =
            decode("list items of repository", &target(project, repository), &response)?;
        Ok(list.value)
    }

    /// Languages recognised from the extensions of every file in the tree.
    ///
    /// A failed listing is logged and yields an empty set.
    pub async fn detect_languages(
        &self,
        project: &ProjectName,
        repository: &AzureDevOpsId,
    ) -> Result<BTreeSet<&'static str>, AzureDevOpsError> {
        let items = match self.items(project, repository).await {
            Ok(items) => items,
            Err(AzureDevOpsError::UnexpectedStatus { status, .. }) => {
                warn!(%project, %repository, status, "Failed to list repository items");
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(e),
        };
        Ok(items
            .iter()
            .filter(|item| !item.is_folder)
            .filter_map(|item| language_for_path(&item.path))
            .collect())
    }

    /// Paths of the pipeline definition (`.yml`) files in the repository.
    pub async fn pipeline_files(
        &self,
        project: &ProjectName,
        repository: &AzureDevOpsId,
    ) -> Result<Vec<String>, AzureDevOpsError> {
        let items = self.items(project, repository).await?;
        Ok(items
            .into_iter()
            .filter(|item| !item.is_folder && item.path.ends_with(PIPELINE_FILE_EXTENSION))
            .map(|item| item.path)
            .collect())
    }
}
