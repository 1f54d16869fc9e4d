//! `ado-repos` and `ado-pipeline-scan`: walks every project and repository of
//! an Azure DevOps organisation.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::{info, info_span, warn, Instrument};

use azure_devops::{AzureDevOpsClient, AzureDevOpsError, Project, Repository};

use crate::report::{
    read_team_assignments, write_inventory, write_pipeline_files, InventoryRow, PipelineFileRow, Platform,
    ReportColumns, TeamAssignment,
};

/// Every repository of every project. A failed project listing fails the run;
/// a project whose repositories cannot be listed is logged and skipped.
async fn project_repositories(ado: &AzureDevOpsClient) -> anyhow::Result<Vec<(Project, Vec<Repository>)>> {
    let projects = ado.projects().await?;
    info!(count = projects.len(), "Fetched projects");

    let mut result = Vec::with_capacity(projects.len());
    for project in projects {
        match ado.repositories(&project.name).await {
            Ok(repositories) => result.push((project, repositories)),
            Err(e) => warn!(project = %project.name, error = %e, "Skipping project"),
        }
    }
    Ok(result)
}

/// Writes the repository inventory to `output`.
pub async fn run_repositories(ado: &AzureDevOpsClient, output: &Path, columns: ReportColumns) -> anyhow::Result<()> {
    let teams = if columns.teams {
        read_team_assignments(output)?
    } else {
        HashMap::new()
    };

    let rows = collect_repositories(ado, columns, &teams).await?;
    write_inventory(output, Platform::AzureDevOps, columns, &rows)?;
    Ok(())
}

/// Builds one row per repository. Repositories whose details cannot be read
/// are logged and left out.
pub async fn collect_repositories(
    ado: &AzureDevOpsClient,
    columns: ReportColumns,
    teams: &HashMap<String, TeamAssignment>,
) -> anyhow::Result<Vec<InventoryRow>> {
    let mut rows = Vec::new();
    for (project, repositories) in project_repositories(ado).await? {
        let span = info_span!("project", project = %project.name, repositories = repositories.len());
        async {
            for repository in &repositories {
                match inventory_row(ado, &project, repository, columns, teams).await {
                    Ok(row) => rows.push(row),
                    Err(e) => warn!(repository = %repository.name, error = %e, "Skipping repository"),
                }
            }
        }
        .instrument(span)
        .await;
    }
    Ok(rows)
}

async fn inventory_row(
    ado: &AzureDevOpsClient,
    project: &Project,
    repository: &Repository,
    columns: ReportColumns,
    teams: &HashMap<String, TeamAssignment>,
) -> Result<InventoryRow, AzureDevOpsError> {
    info!(repository = %repository.name, "Fetching repository details");
    let last_commit = ado.last_commit(&project.name, &repository.id).await?;
    let details = ado.repository(&project.name, &repository.id).await?;
    let languages = if columns.languages {
        ado.detect_languages(&project.name, &repository.id).await?
    } else {
        BTreeSet::new()
    };

    Ok(InventoryRow {
        project: Some(project.name.clone()),
        repository: repository.name.clone(),
        size: details.size,
        last_commit,
        languages,
        team: teams.get(repository.name.as_str()).cloned().unwrap_or_default(),
    })
}

/// Writes the YAML pipeline files of every repository to `output`.
pub async fn run_pipeline_scan(ado: &AzureDevOpsClient, output: &Path) -> anyhow::Result<()> {
    let rows = collect_pipeline_files(ado).await?;
    write_pipeline_files(output, &rows)?;
    Ok(())
}

/// Lists pipeline files per repository; repositories whose item tree cannot
/// be read are logged and skipped.
pub async fn collect_pipeline_files(ado: &AzureDevOpsClient) -> anyhow::Result<Vec<PipelineFileRow>> {
    let mut rows = Vec::new();
    for (project, repositories) in project_repositories(ado).await? {
        for repository in repositories {
            let files = match ado.pipeline_files(&project.name, &repository.id).await {
                Ok(files) => files,
                Err(e) => {
                    warn!(project = %project.name, repository = %repository.name, error = %e, "Failed to list items");
                    continue;
                }
            };
            if files.is_empty() {
                info!(project = %project.name, repository = %repository.name, "No YAML pipelines found");
                continue;
            }
            info!(project = %project.name, repository = %repository.name, count = files.len(), "Found YAML pipelines");
            rows.extend(files.into_iter().map(|path| PipelineFileRow {
                project: project.name.clone(),
                repository: repository.name.clone(),
                path,
            }));
        }
    }
    Ok(rows)
}
