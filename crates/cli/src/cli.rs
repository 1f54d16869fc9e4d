//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bulk administration of GitHub and Azure DevOps repositories.
#[derive(Parser, Debug)]
#[command(name = "repo-admin")]
#[command(about = "Bulk administration of GitHub and Azure DevOps repositories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Keep going after a failed item or batch; failures are reported at the end
    #[arg(long, global = true)]
    pub continue_on_error: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add topics to GitHub repositories listed in a CSV file (columns Repo, Owner, Topics)
    AddTopics {
        /// Path to the CSV file
        csv_path: String,
    },

    /// Attach a code security configuration to GitHub repositories listed in a CSV file (column Repo)
    AttachSecurityConfig {
        /// User or organisation that owns the repositories
        owner: String,

        /// Name of the code security configuration to attach
        config_name: String,

        /// Path to the CSV file
        csv_path: String,
    },

    /// Write an inventory of the repositories of GITHUB_ORG
    GithubRepos {
        /// Report path
        #[arg(long, default_value = "github_repos.csv")]
        output: PathBuf,
    },

    /// Write an inventory of every repository in AZURE_DEVOPS_ORG
    AdoRepos {
        /// Report path
        #[arg(long, default_value = "azure_devops_repos.csv")]
        output: PathBuf,
    },

    /// List the YAML pipeline files of every repository in AZURE_DEVOPS_ORG
    AdoPipelineScan {
        /// Report path
        #[arg(long, default_value = "azure_devops_pipelines.csv")]
        output: PathBuf,
    },
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTopics { .. } => "add-topics",
            Command::AttachSecurityConfig { .. } => "attach-security-config",
            Command::GithubRepos { .. } => "github-repos",
            Command::AdoRepos { .. } => "ado-repos",
            Command::AdoPipelineScan { .. } => "ado-pipeline-scan",
        }
    }
}
