//! Subcommand implementations.
//!
//! | Module | Command |
//! |--------|---------|
//! | [`add_topics`] | `add-topics` |
//! | [`attach_security`] | `attach-security-config` |
//! | [`github_inventory`] | `github-repos` |
//! | [`ado_inventory`] | `ado-repos`, `ado-pipeline-scan` |
//!
//! Each command receives its clients and [`Settings`] explicitly; nothing is
//! read from the environment below [`run`].

pub mod add_topics;
pub mod ado_inventory;
pub mod attach_security;
pub mod github_inventory;

use std::fmt::Display;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::error;

use azure_devops::AzureDevOpsClient;
use client::{RateLimitedClient, ReqwestTransport};
use domain::{ConfigResolver, ConfigurationName, OwnerName};
use github::GitHubClient;

use crate::cli::{Cli, Command};
use crate::input::{read_repository_names, read_topic_rows};
use crate::report::ReportColumns;
use crate::settings::{github_organization, github_token, AzureDevOpsAccess, Settings};

/// What to do when one item or batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failure.
    #[default]
    FailFast,
    /// Record the failure and move on; the run still fails at the end.
    ContinueOnError,
}

impl ErrorPolicy {
    pub fn from_flag(continue_on_error: bool) -> Self {
        if continue_on_error {
            ErrorPolicy::ContinueOnError
        } else {
            ErrorPolicy::FailFast
        }
    }
}

/// Applies an [`ErrorPolicy`] to a sequence of item results.
#[derive(Debug)]
pub struct Failures {
    policy: ErrorPolicy,
    attempted: usize,
    failed: Vec<String>,
}

impl Failures {
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            attempted: 0,
            failed: Vec::new(),
        }
    }

    /// Records the outcome for `item`.
    ///
    /// Under [`ErrorPolicy::FailFast`] an error is returned with `item` as
    /// context; otherwise it is logged and remembered.
    pub fn record<E>(&mut self, item: impl Display, result: Result<(), E>) -> anyhow::Result<()>
    where
        E: Into<anyhow::Error>,
    {
        self.attempted += 1;
        let Err(err) = result else {
            return Ok(());
        };
        let err = err.into();
        match self.policy {
            ErrorPolicy::FailFast => Err(err.context(format!("Failed to process {item}"))),
            ErrorPolicy::ContinueOnError => {
                let item = item.to_string();
                error!(%item, error = format!("{err:#}"), "Item failed, continuing");
                self.failed.push(item);
                Ok(())
            }
        }
    }

    /// Records one outcome shared by every item in `items`.
    ///
    /// Each item counts as attempted; on error they all count as failed, and
    /// under [`ErrorPolicy::FailFast`] the error carries `label` as context.
    pub fn record_batch<T, E>(&mut self, label: impl Display, items: &[T], result: Result<(), E>) -> anyhow::Result<()>
    where
        T: Display,
        E: Into<anyhow::Error>,
    {
        self.attempted += items.len();
        let Err(err) = result else {
            return Ok(());
        };
        let err = err.into();
        match self.policy {
            ErrorPolicy::FailFast => Err(err.context(format!("Failed to process {label}"))),
            ErrorPolicy::ContinueOnError => {
                let label = label.to_string();
                error!(batch = %label, items = items.len(), error = format!("{err:#}"), "Batch failed, continuing");
                self.failed.extend(items.iter().map(ToString::to_string));
                Ok(())
            }
        }
    }

    /// Items recorded as failed so far.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Succeeds only if nothing failed.
    pub fn finish(self) -> anyhow::Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        bail!(
            "{} of {} items failed: {}",
            self.failed.len(),
            self.attempted,
            self.failed.join(", ")
        )
    }
}

/// Resolves settings, builds the clients the command needs, and runs it.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let resolver = ConfigResolver::from_env();
    let settings = Settings::resolve(&resolver);
    let policy = ErrorPolicy::from_flag(cli.continue_on_error);
    let transport = ReqwestTransport::new().context("Failed to create HTTP client")?;
    let http = RateLimitedClient::new(Arc::new(transport), settings.api_timeout);
    let columns = ReportColumns {
        languages: settings.label_languages,
        teams: settings.label_teams,
    };

    match cli.command {
        Command::AddTopics { csv_path } => {
            let github = GitHubClient::new(http, &github_token(&resolver)?)?;
            let rows = read_topic_rows(&csv_path)?;
            add_topics::run(&github, &rows, &settings, policy).await
        }
        Command::AttachSecurityConfig {
            owner,
            config_name,
            csv_path,
        } => {
            let github = GitHubClient::new(http, &github_token(&resolver)?)?;
            let owner = OwnerName::new(owner).context("Owner must not be blank")?;
            let config_name = ConfigurationName::new(config_name).context("Configuration name must not be blank")?;
            let repositories = read_repository_names(&csv_path)?;
            attach_security::run(&github, &owner, &config_name, &repositories, &settings, policy).await
        }
        Command::GithubRepos { output } => {
            let github = GitHubClient::new(http, &github_token(&resolver)?)?;
            let org = github_organization(&resolver)?;
            github_inventory::run(&github, &org, &output, columns, &settings).await
        }
        Command::AdoRepos { output } => {
            let access = AzureDevOpsAccess::resolve(&resolver)?;
            let ado = AzureDevOpsClient::new(http, &access.organization, &access.token)?;
            ado_inventory::run_repositories(&ado, &output, columns).await
        }
        Command::AdoPipelineScan { output } => {
            let access = AzureDevOpsAccess::resolve(&resolver)?;
            let ado = AzureDevOpsClient::new(http, &access.organization, &access.token)?;
            ado_inventory::run_pipeline_scan(&ado, &output).await
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use client::{ManualClock, RateLimitedClient, ReqwestTransport};
    use domain::{ApiTimeout, Credential, Timestamp};
    use github::GitHubClient;
    use wiremock::MockServer;

    pub fn http_client() -> (RateLimitedClient, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_at(
            Timestamp::from_epoch_seconds(1_700_000_000).unwrap(),
        ));
        let http = RateLimitedClient::new(
            Arc::new(ReqwestTransport::new().unwrap()),
            ApiTimeout::from_secs_f64(60.0).unwrap(),
        )
        .with_clock(clock.clone());
        (http, clock)
    }

    pub fn github_client(server: &MockServer) -> GitHubClient {
        let (http, _) = http_client();
        GitHubClient::with_base_url(http, &Credential::new("ghp_test").unwrap(), server.uri()).unwrap()
    }
}
