//! Shared set-up for GitHub adapter tests.
#![allow(dead_code)]

use std::sync::Arc;

use client::{ManualClock, RateLimitedClient, ReqwestTransport};
use domain::{ApiTimeout, Credential, OwnerName, RepositoryName, RepositoryRef, Timestamp};
use github::GitHubClient;
use wiremock::MockServer;

/// `Basic base64("ghp_test")`.
pub const AUTHORIZATION: &str = "Basic Z2hwX3Rlc3Q=";

pub fn github_client(server: &MockServer) -> (GitHubClient, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_at(
        Timestamp::from_epoch_seconds(1_700_000_000).unwrap(),
    ));
    let http = RateLimitedClient::new(
        Arc::new(ReqwestTransport::new().unwrap()),
        ApiTimeout::from_secs_f64(60.0).unwrap(),
    )
    .with_clock(clock.clone());
    let token = Credential::new("ghp_test").unwrap();
    let client = GitHubClient::with_base_url(http, &token, server.uri()).unwrap();
    (client, clock)
}

pub fn repo(owner: &str, name: &str) -> RepositoryRef {
    RepositoryRef::new(OwnerName::new(owner).unwrap(), RepositoryName::new(name).unwrap())
}
