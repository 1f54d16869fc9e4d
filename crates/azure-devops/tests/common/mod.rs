//! Shared set-up for Azure DevOps adapter tests.
#![allow(dead_code)]

use std::sync::Arc;

use azure_devops::AzureDevOpsClient;
use client::{ManualClock, RateLimitedClient, ReqwestTransport};
use domain::{ApiTimeout, AzureDevOpsId, Credential, ProjectName, Timestamp};
use wiremock::MockServer;

/// `Basic base64(":ado_test")`.
pub const AUTHORIZATION: &str = "Basic OmFkb190ZXN0";

/// Organisation path segment the mock server is addressed with.
pub const ORGANIZATION: &str = "contoso";

pub fn ado_client(server: &MockServer) -> (AzureDevOpsClient, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_at(
        Timestamp::from_epoch_seconds(1_700_000_000).unwrap(),
    ));
    let http = RateLimitedClient::new(
        Arc::new(ReqwestTransport::new().unwrap()),
        ApiTimeout::from_secs_f64(60.0).unwrap(),
    )
    .with_clock(clock.clone());
    let token = Credential::new("ado_test").unwrap();
    let base_url = format!("{}/{ORGANIZATION}", server.uri());
    let client = AzureDevOpsClient::with_base_url(http, &token, &base_url).unwrap();
    (client, clock)
}

pub fn project(name: &str) -> ProjectName {
    ProjectName::new(name).unwrap()
}

pub fn repo_id(id: &str) -> AzureDevOpsId {
    AzureDevOpsId::new(id).unwrap()
}
