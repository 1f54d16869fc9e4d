//! `add-topics`: merge topics into GitHub repositories, batch by batch.

use tracing::{info, info_span, Instrument};

use domain::BatchPartitioner;
use github::{GitHubClient, TopicChange};

use super::{ErrorPolicy, Failures};
use crate::input::TopicRow;
use crate::settings::Settings;

/// Adds each row's topics to its repository.
///
/// Rows without topics are skipped without any API call. Each row is one
/// item for the [`ErrorPolicy`].
pub async fn run(
    github: &GitHubClient,
    rows: &[TopicRow],
    settings: &Settings,
    policy: ErrorPolicy,
) -> anyhow::Result<()> {
    let partitioner = BatchPartitioner::new(settings.batch_size);
    let batch_count = partitioner.batch_count(rows.len());
    let mut failures = Failures::new(policy);
    let mut updated = 0usize;

    for (number, batch) in partitioner.partition(rows).enumerate() {
        let span = info_span!("batch", number = number + 1, of = batch_count, size = batch.len());
        async {
            for row in batch.items() {
                let result = github.add_repository_topics(&row.repository, &row.topics).await;
                if let Ok(TopicChange::Updated { .. }) = &result {
                    updated += 1;
                }
                failures.record(&row.repository, result.map(|_| ()))?;
            }
            anyhow::Ok(())
        }
        .instrument(span)
        .await?;
    }

    info!(rows = rows.len(), updated, failed = failures.failed().len(), "Topic update finished");
    failures.finish()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use domain::{BatchSize, ConfigResolver, OwnerName, RepositoryName, RepositoryRef, Topic};

    use super::*;
    use crate::commands::test_support::github_client;

    fn row(name: &str, topics: &[&str]) -> TopicRow {
        TopicRow {
            repository: RepositoryRef::new(OwnerName::new("octo").unwrap(), RepositoryName::new(name).unwrap()),
            topics: topics.iter().map(|t| Topic::new(*t).unwrap()).collect(),
        }
    }

    fn settings(batch_size: usize) -> Settings {
        let mut settings = Settings::resolve(&ConfigResolver::from_pairs(Vec::<(String, String)>::new()));
        settings.batch_size = BatchSize::new(batch_size).unwrap();
        settings
    }

    async fn mount_topics(server: &MockServer, repo: &str, status: u16, names: &[&str]) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/octo/{repo}/topics")))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "names": names })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn every_row_is_processed_across_batches() {
        let server = MockServer::start().await;
        for repo in ["a", "b", "c"] {
            mount_topics(&server, repo, 200, &["existing"]).await;
            Mock::given(method("PUT"))
                .and(path(format!("/repos/octo/{repo}/topics")))
                .and(body_json(json!({ "names": ["existing", "rust"] })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "names": ["existing", "rust"] })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let github = github_client(&server);
        let rows = [row("a", &["rust"]), row("b", &["rust"]), row("c", &["rust"]), row("d", &[])];
        run(&github, &rows, &settings(2), ErrorPolicy::FailFast).await.unwrap();
    }

    #[tokio::test]
    async fn fail_fast_stops_at_the_first_failed_row() {
        let server = MockServer::start().await;
        mount_topics(&server, "broken", 404, &[]).await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/after/topics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "names": [] })))
            .expect(0)
            .mount(&server)
            .await;

        let github = github_client(&server);
        let rows = [row("broken", &["rust"]), row("after", &["rust"])];
        let err = run(&github, &rows, &settings(5), ErrorPolicy::FailFast).await.unwrap_err();

        let message = format!("{err:#}");
        assert!(message.starts_with("Failed to process octo/broken: Failed to fetch topics for octo/broken: 404"), "{message}");
    }

    #[tokio::test]
    async fn continue_on_error_processes_the_remaining_rows() {
        let server = MockServer::start().await;
        mount_topics(&server, "broken", 404, &[]).await;
        mount_topics(&server, "after", 200, &[]).await;
        Mock::given(method("PUT"))
            .and(path("/repos/octo/after/topics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "names": ["rust"] })))
            .expect(1)
            .mount(&server)
            .await;

        let github = github_client(&server);
        let rows = [row("broken", &["rust"]), row("after", &["rust"])];
        let err = run(&github, &rows, &settings(1), ErrorPolicy::ContinueOnError).await.unwrap_err();

        assert_eq!(err.to_string(), "1 of 2 items failed: octo/broken");
    }
}
