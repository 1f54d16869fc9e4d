//! Organisation code security configurations.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use client::HttpMethod;
use domain::{ConfigurationName, GitHubRepositoryId, LookupError, OwnerName, SecurityConfigurationId};

use crate::repositories::PAGE_SIZE;
use crate::rest::{decode, ensure_success};
use crate::{GitHubClient, GitHubError};

/// One entry of the organisation's configuration list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeSecurityConfiguration {
    pub id: SecurityConfigurationId,
    pub name: String,
    #[serde(default)]
    pub target_type: Option<String>,
}

impl GitHubClient {
    /// Lists the code security configurations defined for `org`.
    #[instrument(skip(self), fields(org = %org))]
    pub async fn code_security_configurations(
        &self,
        org: &OwnerName,
    ) -> Result<Vec<CodeSecurityConfiguration>, GitHubError> {
        let mut configurations = Vec::new();
        let mut page = 1;
        loop {
            let request = self.request(
                HttpMethod::Get,
                &format!("/orgs/{org}/code-security/configurations?per_page={PAGE_SIZE}&page={page}"),
            );
            let response = self.send(request).await?;
            let batch: Vec<CodeSecurityConfiguration> =
                decode("list code security configurations for", org, &response)?;
            let last_page = batch.len() < PAGE_SIZE;
            debug!(page, count = batch.len(), "Fetched configuration page");
            configurations.extend(batch);
            if last_page {
                return Ok(configurations);
            }
            page += 1;
        }
    }

    /// Resolves a configuration name to its id.
    ///
    /// Fails with [`LookupError::NotFound`] carrying the name when no
    /// configuration matches exactly.
    #[instrument(skip(self), fields(org = %org, name = %name))]
    pub async fn code_security_configuration_id(
        &self,
        org: &OwnerName,
        name: &ConfigurationName,
    ) -> Result<SecurityConfigurationId, GitHubError> {
        let configurations = self.code_security_configurations(org).await?;
        let id = configurations
            .into_iter()
            .find(|c| c.name == name.as_str())
            .map(|c| c.id)
            .ok_or_else(|| LookupError::NotFound {
                entity: "Code security configuration",
                key: name.to_string(),
            })?;
        debug!(%id, "Resolved code security configuration");
        Ok(id)
    }

    /// Attaches configuration `id` to the given repositories of `org`.
    ///
    /// GitHub answers `202 Accepted`; the attachment completes asynchronously.
    #[instrument(skip(self, repositories), fields(org = %org, id = %id, count = repositories.len()))]
    pub async fn attach_code_security_configuration(
        &self,
        org: &OwnerName,
        id: SecurityConfigurationId,
        repositories: &[GitHubRepositoryId],
    ) -> Result<(), GitHubError> {
        let request = self
            .request(
                HttpMethod::Post,
                &format!("/orgs/{org}/code-security/configurations/{id}/attach"),
            )
            .with_json(json!({
                "scope": "selected",
                "selected_repository_ids": repositories,
            }));
        let response = self.send(request).await?;
        ensure_success("attach code security configuration for", org, &response)
    }
}
