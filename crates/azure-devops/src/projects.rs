//! Organisation projects and their Git repositories.

use serde::Deserialize;
use tracing::{debug, instrument};

use domain::{AzureDevOpsId, ProjectName, RepositoryName};

use crate::rest::{decode, ValueList};
use crate::{AzureDevOpsClient, AzureDevOpsError};

/// Projects requested per page.
const PAGE_SIZE: usize = 100;

/// Response header carrying the token for the next page of projects.
const CONTINUATION_TOKEN_HEADER: &str = "x-ms-continuationtoken";

/// A team project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: AzureDevOpsId,
    pub name: ProjectName,
}

/// A Git repository inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub id: AzureDevOpsId,
    pub name: RepositoryName,
    /// Size in bytes. Only filled in by the single-repository endpoint.
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "webUrl")]
    pub web_url: Option<String>,
}

impl AzureDevOpsClient {
    /// Lists the projects of the organisation.
    ///
    /// Follows the `x-ms-continuationtoken` header until the service stops
    /// returning one.
    #[instrument(skip(self))]
    pub async fn projects(&self) -> Result<Vec<Project>, AzureDevOpsError> {
        let page_size = PAGE_SIZE.to_string();
        let mut projects = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let request = {
                let mut query = vec![("$top", page_size.as_str())];
                if let Some(token) = continuation.as_deref() {
                    query.push(("continuationToken", token));
                }
                self.get(&["_apis", "projects"], &query)?
            };
            let response = self.send(request).await?;
            let list: ValueList<Project> = decode("fetch projects for", self.base_url(), &response)?;
            debug!(count = list.value.len(), "Fetched page of projects");
            projects.extend(list.value);

            match response.header_str(CONTINUATION_TOKEN_HEADER).map(str::trim) {
                Some(token) if !token.is_empty() => continuation = Some(token.to_string()),
                _ => break,
            }
        }
        debug!(count = projects.len(), "Fetched projects");
        Ok(projects)
    }

    /// Lists the Git repositories of `project`.
    #[instrument(skip(self), fields(project = %project))]
    pub async fn repositories(&self, project: &ProjectName) -> Result<Vec<Repository>, AzureDevOpsError> {
        let request = self.get(&[project.as_str(), "_apis", "git", "repositories"], &[])?;
        let response = self.send(request).await?;
        let list: ValueList<Repository> = decode("fetch repositories for project", project, &response)?;
        debug!(count = list.value.len(), "Fetched repositories");
        Ok(list.value)
    }
}
