//! Tests for per-repository reads.

mod common;

use std::collections::BTreeSet;

use common::{ado_client, project, repo_id};
use domain::LastCommit;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO: &str = "/contoso/Payments/_apis/git/repositories/r-1";

fn item_tree() -> serde_json::Value {
    json!({
        "count": 6,
        "value": [
            { "path": "/", "isFolder": true },
            { "path": "/src", "isFolder": true },
            { "path": "/src/app.py" },
            { "path": "/web/index.ts", "isFolder": false },
            { "path": "/azure-pipelines.yml", "isFolder": false },
            { "path": "/deploy/release.yml", "isFolder": false }
        ]
    })
}

#[tokio::test]
async fn test_repository_details_include_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r-1", "name": "ledger", "size": 52428800
        })))
        .mount(&server)
        .await;

    let (client, _) = ado_client(&server);
    let details = client.repository(&project("Payments"), &repo_id("r-1")).await.unwrap();

    assert_eq!(details.size, Some(52_428_800));
}

#[tokio::test]
async fn test_last_commit_requests_only_the_newest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/commits")))
        .and(query_param("$top", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "value": [{ "commitId": "abc", "committer": { "name": "A", "date": "2024-03-04T05:06:07Z" } }]
        })))
        .mount(&server)
        .await;

    let (client, _) = ado_client(&server);
    let last = client.last_commit(&project("Payments"), &repo_id("r-1")).await.unwrap();

    assert_eq!(last, LastCommit::Date("2024-03-04T05:06:07Z".to_string()));
}

#[tokio::test]
async fn test_empty_history_has_no_commits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/commits")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "value": [] })))
        .mount(&server)
        .await;

    let (client, _) = ado_client(&server);
    let last = client.last_commit(&project("Payments"), &repo_id("r-1")).await.unwrap();

    assert_eq!(last, LastCommit::NoCommits);
}

#[tokio::test]
async fn test_commit_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/commits")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (client, _) = ado_client(&server);
    let last = client.last_commit(&project("Payments"), &repo_id("r-1")).await.unwrap();

    assert_eq!(last, LastCommit::Unavailable);
}

#[tokio::test]
async fn test_languages_come_from_files_in_the_full_tree() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/items")))
        .and(query_param("recursionLevel", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_tree()))
        .mount(&server)
        .await;

    let (client, _) = ado_client(&server);
    let languages = client
        .detect_languages(&project("Payments"), &repo_id("r-1"))
        .await
        .unwrap();

    assert_eq!(languages, BTreeSet::from(["Python", "TypeScript"]));
}

#[tokio::test]
async fn test_language_detection_tolerates_a_failed_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/items")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (client, _) = ado_client(&server);
    let languages = client
        .detect_languages(&project("Payments"), &repo_id("r-1"))
        .await
        .unwrap();

    assert!(languages.is_empty());
}

#[tokio::test]
async fn test_pipeline_files_are_the_yml_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/items")))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_tree()))
        .mount(&server)
        .await;

    let (client, _) = ado_client(&server);
    let files = client
        .pipeline_files(&project("Payments"), &repo_id("r-1"))
        .await
        .unwrap();

    assert_eq!(files, ["/azure-pipelines.yml", "/deploy/release.yml"]);
}
