//! `github-repos`: inventory of an organisation's repositories.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::{info, info_span, warn, Instrument};

use domain::{BatchPartitioner, OwnerName, RepositoryRef};
use github::{GitHubClient, GitHubError, RepositorySummary};

use crate::report::{read_team_assignments, write_inventory, InventoryRow, Platform, ReportColumns, TeamAssignment};
use crate::settings::Settings;

/// Lists every repository of `org` and writes the report to `output`.
///
/// Team assignments are carried over from the report already at `output`.
pub async fn run(
    github: &GitHubClient,
    org: &OwnerName,
    output: &Path,
    columns: ReportColumns,
    settings: &Settings,
) -> anyhow::Result<()> {
    let teams = if columns.teams {
        read_team_assignments(output)?
    } else {
        HashMap::new()
    };

    let rows = collect(github, org, columns, &teams, settings).await?;
    write_inventory(output, Platform::GitHub, columns, &rows)?;
    Ok(())
}

/// Builds one row per repository. Repositories whose details cannot be read
/// are logged and left out.
pub async fn collect(
    github: &GitHubClient,
    org: &OwnerName,
    columns: ReportColumns,
    teams: &HashMap<String, TeamAssignment>,
    settings: &Settings,
) -> anyhow::Result<Vec<InventoryRow>> {
    let repositories = github.organization_repositories(org).await?;
    info!(%org, count = repositories.len(), "Fetched organisation repositories");

    let partitioner = BatchPartitioner::new(settings.batch_size);
    let batch_count = partitioner.batch_count(repositories.len());
    let mut rows = Vec::with_capacity(repositories.len());

    for (number, batch) in partitioner.partition(&repositories).enumerate() {
        let span = info_span!("batch", number = number + 1, of = batch_count, size = batch.len());
        async {
            for summary in batch.items() {
                let repo = RepositoryRef::new(org.clone(), summary.name.clone());
                match inventory_row(github, &repo, summary, columns, teams).await {
                    Ok(row) => rows.push(row),
                    Err(e) => warn!(%repo, error = %e, "Skipping repository"),
                }
            }
        }
        .instrument(span)
        .await;
    }

    Ok(rows)
}

async fn inventory_row(
    github: &GitHubClient,
    repo: &RepositoryRef,
    summary: &RepositorySummary,
    columns: ReportColumns,
    teams: &HashMap<String, TeamAssignment>,
) -> Result<InventoryRow, GitHubError> {
    info!(%repo, "Fetching repository details");
    let last_commit = github.last_commit(repo).await?;
    let details = github.repository(repo).await?;
    let languages = if columns.languages {
        github.detect_languages(repo).await?
    } else {
        BTreeSet::new()
    };

    Ok(InventoryRow {
        project: None,
        repository: summary.name.clone(),
        size: details.size,
        last_commit,
        languages,
        team: teams.get(summary.name.as_str()).cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use domain::ConfigResolver;

    use super::*;
    use crate::commands::test_support::github_client;

    async fn mount_organization(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/orgs/octo/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "alpha" },
                { "id": 2, "name": "beta" },
                { "id": 3, "name": "gamma" }
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/alpha/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "commit": { "committer": { "date": "2024-02-02T00:00:00Z" } } }
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/alpha"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "alpha", "size": 300 })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/alpha/contents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "type": "file", "path": "lib.rs" }])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/beta/commits"))
            .respond_with(ResponseTemplate::new(409))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/beta"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/gamma/commits"))
            .respond_with(ResponseTemplate::new(409))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/gamma"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "name": "gamma", "size": 0 })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/gamma/contents"))
            .respond_with(ResponseTemplate::new(404))
            .mount(server)
            .await;
    }

    fn settings() -> Settings {
        Settings::resolve(&ConfigResolver::from_pairs([("BATCH_SIZE", "2")]))
    }

    #[tokio::test]
    async fn repositories_without_details_are_skipped() {
        let server = MockServer::start().await;
        mount_organization(&server).await;

        let github = github_client(&server);
        let rows = collect(
            &github,
            &OwnerName::new("octo").unwrap(),
            ReportColumns::default(),
            &HashMap::new(),
            &settings(),
        )
        .await
        .unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.repository.as_str()).collect();
        assert_eq!(names, ["alpha", "gamma"]);
        assert_eq!(rows[1].last_commit.to_string(), "No commits");
    }

    #[tokio::test]
    async fn report_carries_languages_and_previous_teams() {
        let server = MockServer::start().await;
        mount_organization(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("github_repos.csv");
        let columns = ReportColumns {
            languages: true,
            teams: true,
        };

        let previous = InventoryRow {
            project: None,
            repository: domain::RepositoryName::new("alpha").unwrap(),
            size: Some(1),
            last_commit: domain::LastCommit::NoCommits,
            languages: BTreeSet::new(),
            team: TeamAssignment {
                team: "Core".into(),
                owner: "jdoe".into(),
            },
        };
        write_inventory(&output, Platform::GitHub, columns, &[previous]).unwrap();

        let github = github_client(&server);
        run(&github, &OwnerName::new("octo").unwrap(), &output, columns, &settings())
            .await
            .unwrap();

        let report = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            report,
            "Repository Name,Size in KB,Last Commit Date,Languages,Team Name,Owner\n\
             alpha,300,2024-02-02T00:00:00Z,Rust,Core,jdoe\n\
             gamma,0,No commits,,N/A,N/A\n"
        );
    }
}
