//! Repository inventory: listing, details, last commit, and languages.

use std::collections::BTreeSet;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use client::HttpMethod;
use domain::{language_for_path, GitHubRepositoryId, LastCommit, OwnerName, RepositoryName, RepositoryRef};

use crate::rest::decode;
use crate::{GitHubClient, GitHubError};

/// Page size used for paginated listings (GitHub's maximum).
pub const PAGE_SIZE: usize = 100;

/// A repository as returned by the organisation listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositorySummary {
    pub id: GitHubRepositoryId,
    pub name: RepositoryName,
}

/// The subset of `GET /repos/{owner}/{repo}` used by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryDetails {
    pub id: GitHubRepositoryId,
    pub name: RepositoryName,
    /// Size in kilobytes.
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitData,
}

#[derive(Debug, Deserialize)]
struct CommitData {
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

impl GitHubClient {
    /// Lists every repository of `org`, following pagination.
    #[instrument(skip(self), fields(org = %org))]
    pub async fn organization_repositories(
        &self,
        org: &OwnerName,
    ) -> Result<Vec<RepositorySummary>, GitHubError> {
        let mut repositories = Vec::new();
        let mut page = 1;
        loop {
            let request = self.request(
                HttpMethod::Get,
                &format!("/orgs/{org}/repos?per_page={PAGE_SIZE}&page={page}"),
            );
            let response = self.send(request).await?;
            let batch: Vec<RepositorySummary> = decode("list repositories of", org, &response)?;
            let last_page = batch.len() < PAGE_SIZE;
            debug!(page, count = batch.len(), "Fetched repository page");
            repositories.extend(batch);
            if last_page {
                return Ok(repositories);
            }
            page += 1;
        }
    }

    /// Fetches the details of `repo`.
    #[instrument(skip(self), fields(repo = %repo))]
    pub async fn repository(&self, repo: &RepositoryRef) -> Result<RepositoryDetails, GitHubError> {
        let request = self.request(HttpMethod::Get, &format!("/repos/{}/{}", repo.owner, repo.name));
        let response = self.send(request).await?;
        decode("fetch details for", repo, &response)
    }

    /// Resolves the numeric id of `repo`.
    pub async fn repository_id(&self, repo: &RepositoryRef) -> Result<GitHubRepositoryId, GitHubError> {
        Ok(self.repository(repo).await?.id)
    }

    /// The committer date of the newest commit on the default branch.
    ///
    /// GitHub answers `409` for repositories without commits; any other
    /// failure status degrades to [`LastCommit::Unavailable`].
    #[instrument(skip(self), fields(repo = %repo))]
    pub async fn last_commit(&self, repo: &RepositoryRef) -> Result<LastCommit, GitHubError> {
        let request = self.request(
            HttpMethod::Get,
            &format!("/repos/{}/{}/commits?per_page=1", repo.owner, repo.name),
        );
        let response = self.send(request).await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(LastCommit::NoCommits);
        }
        if !response.is_success() {
            warn!(status = response.status().as_u16(), "Failed to fetch commits");
            return Ok(LastCommit::Unavailable);
        }

        match response.json::<Vec<CommitEntry>>() {
            Ok(commits) => Ok(commits
                .into_iter()
                .next()
                .map(|entry| {
                    entry
                        .commit
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

    /// Languages recognised from the file extensions at the repository root.
    ///
    /// A failed listing yields an empty set.
    #[instrument(skip(self), fields(repo = %repo))]
    pub async fn detect_languages(&self, repo: &RepositoryRef) -> Result<BTreeSet<&'static str>, GitHubError> {
        let request = self.request(HttpMethod::Get, &format!("/repos/{}/{}/contents", repo.owner, repo.name));
        let response = self.send(request).await?;
        if !response.is_success() {
            warn!(status = response.status().as_u16(), "Failed to list repository contents");
            return Ok(BTreeSet::new());
        }

        let entries: Vec<ContentEntry> = match response.json() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Unexpected repository contents listing");
                return Ok(BTreeSet::new());
            }
        };
        Ok(entries
            .iter()
            .filter(|entry| entry.kind != "dir")
            .filter_map(|entry| language_for_path(&entry.path))
            .collect())
    }
}
