//! Repository topics: read, replace, and additive merge.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use client::HttpMethod;
use domain::{RepositoryRef, Topic};

use crate::rest::{decode, ensure_success};
use crate::{GitHubClient, GitHubError};

/// Outcome of [`GitHubClient::add_repository_topics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicChange {
    /// No topics were requested; nothing was fetched or written.
    NothingRequested,
    /// Every requested topic was already present; nothing was written.
    AlreadyPresent,
    /// The repository's topics were replaced with `topics`.
    Updated {
        /// Requested topics that were not present before.
        added: Vec<Topic>,
        /// The full topic list written back.
        topics: Vec<Topic>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct TopicNames {
    #[serde(default)]
    names: Vec<Topic>,
}

/// Splits a semicolon-separated topic list, dropping blank entries.
pub fn parse_topic_list(raw: &str) -> Vec<Topic> {
    raw.split(';').filter_map(Topic::new).collect()
}

/// Appends the requested topics that are missing from `current`.
///
/// Returns `None` when nothing is missing. Existing topics keep their order;
/// duplicates in `requested` are collapsed.
pub fn merge_topics(current: &[Topic], requested: &[Topic]) -> Option<Vec<Topic>> {
    let mut merged = current.to_vec();
    for topic in requested {
        if !merged.contains(topic) {
            merged.push(topic.clone());
        }
    }
    if merged.len() == current.len() {
        None
    } else {
        Some(merged)
    }
}

impl GitHubClient {
    /// Fetches the current topics of `repo`.
    #[instrument(skip(self), fields(repo = %repo))]
    pub async fn repository_topics(&self, repo: &RepositoryRef) -> Result<Vec<Topic>, GitHubError> {
        let request = self.request(HttpMethod::Get, &format!("/repos/{}/{}/topics", repo.owner, repo.name));
        let response = self.send(request).await?;
        let names: TopicNames = decode("fetch topics for", repo, &response)?;
        Ok(names.names)
    }

    /// Replaces the topics of `repo` with exactly `topics`.
    #[instrument(skip(self, topics), fields(repo = %repo, count = topics.len()))]
    pub async fn replace_repository_topics(
        &self,
        repo: &RepositoryRef,
        topics: &[Topic],
    ) -> Result<(), GitHubError> {
        let request = self
            .request(HttpMethod::Put, &format!("/repos/{}/{}/topics", repo.owner, repo.name))
            .with_json(json!({ "names": topics }));
        let response = self.send(request).await?;
        ensure_success("update topics for", repo, &response)
    }

    /// Adds `requested` to the topics of `repo` without removing existing ones.
    #[instrument(skip(self, requested), fields(repo = %repo))]
    pub async fn add_repository_topics(
        &self,
        repo: &RepositoryRef,
        requested: &[Topic],
    ) -> Result<TopicChange, GitHubError> {
        if requested.is_empty() {
            info!("Skipping, no topics provided");
            return Ok(TopicChange::NothingRequested);
        }

        let current = self.repository_topics(repo).await?;
        let Some(topics) = merge_topics(&current, requested) else {
            info!(?requested, "Skipping, all provided topics already exist");
            return Ok(TopicChange::AlreadyPresent);
        };

        let added: Vec<Topic> = topics[current.len()..].to_vec();
        info!(?added, "Adding topics");
        self.replace_repository_topics(repo, &topics).await?;
        Ok(TopicChange::Updated { added, topics })
    }
}
