//! [`GitHubClient`]: authenticated request construction and response checks
//! shared by the topic, security and repository operations.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;

use client::{basic_authorization, ApiRequest, ApiResponse, HttpMethod, RateLimitedClient};
use domain::Credential;

use crate::GitHubError;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Value sent in the `X-GitHub-Api-Version` header.
pub const API_VERSION: &str = "2022-11-28";

const MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub REST operations over a [`RateLimitedClient`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: RateLimitedClient,
    base_url: String,
    headers: HeaderMap,
}

impl GitHubClient {
    /// Creates a client for `api.github.com`.
    pub fn new(http: RateLimitedClient, token: &Credential) -> Result<Self, GitHubError> {
        Self::with_base_url(http, token, DEFAULT_API_BASE_URL)
    }

    /// Creates a client for a different API root (GitHub Enterprise, tests).
    pub fn with_base_url(
        http: RateLimitedClient,
        token: &Credential,
        base_url: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, basic_authorization(token.expose())?);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// Builds an authenticated request for `path` (which starts with `/`).
    pub(crate) fn request(&self, method: HttpMethod, path: &str) -> ApiRequest {
        ApiRequest::new(method, format!("{}{}", self.base_url, path)).with_headers(&self.headers)
    }

    pub(crate) async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GitHubError> {
        Ok(self.http.execute(&request).await?)
    }
}

/// Fails with [`GitHubError::UnexpectedStatus`] unless the response is 2xx.
pub(crate) fn ensure_success(
    action: &'static str,
    target: &impl ToString,
    response: &ApiResponse,
) -> Result<(), GitHubError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(GitHubError::UnexpectedStatus {
            action,
            target: target.to_string(),
            status: response.status().as_u16(),
            body: response.body().to_string(),
        })
    }
}

/// Checks for a 2xx status and decodes the JSON body.
pub(crate) fn decode<T: DeserializeOwned>(
    action: &'static str,
    target: &impl ToString,
    response: &ApiResponse,
) -> Result<T, GitHubError> {
    ensure_success(action, target, response)?;
    response.json().map_err(|e| GitHubError::Decode {
        action,
        target: target.to_string(),
        message: e.to_string(),
    })
}
