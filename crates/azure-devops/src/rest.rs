//! [`AzureDevOpsClient`]: organisation-scoped URL building and response checks.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use client::{basic_authorization, ApiRequest, ApiResponse, HttpMethod, RateLimitedClient};
use domain::{Credential, OrganizationName};

use crate::AzureDevOpsError;

/// Azure DevOps Services host; the organisation is the first path segment.
pub const DEFAULT_HOST: &str = "https://dev.azure.com";

/// Value of the `api-version` query parameter sent with every call.
pub const API_VERSION: &str = "6.0";

/// The `{"count": n, "value": [...]}` envelope wrapping every list response.
#[derive(Debug, Deserialize)]
pub(crate) struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub(crate) value: Vec<T>,
}

/// Azure DevOps REST operations for one organisation.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    http: RateLimitedClient,
    base_url: Url,
    headers: HeaderMap,
}

impl AzureDevOpsClient {
    /// Creates a client for `https://dev.azure.com/{organization}`.
    pub fn new(
        http: RateLimitedClient,
        organization: &OrganizationName,
        token: &Credential,
    ) -> Result<Self, AzureDevOpsError> {
        Self::with_base_url(http, token, &format!("{DEFAULT_HOST}/{organization}"))
    }

    /// Creates a client rooted at an arbitrary organisation URL (Azure DevOps
    /// Server collections, tests).
    pub fn with_base_url(
        http: RateLimitedClient,
        token: &Credential,
        base_url: &str,
    ) -> Result<Self, AzureDevOpsError> {
        let base_url = Url::parse(base_url).map_err(|e| AzureDevOpsError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AzureDevOpsError::InvalidUrl {
                url: base_url.to_string(),
                message: "not a base URL".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        // Azure DevOps expects an empty user name in front of the token.
        headers.insert(AUTHORIZATION, basic_authorization(&format!(":{}", token.expose()))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            http,
            base_url,
            headers,
        })
    }

    /// The organisation URL every request is built from.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an authenticated GET for the path `segments` below the
    /// organisation, with `query` and `api-version` appended.
    pub(crate) fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<ApiRequest, AzureDevOpsError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| AzureDevOpsError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "not a base URL".to_string(),
            })?;
            path.pop_if_empty().extend(segments);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", API_VERSION);
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(ApiRequest::new(HttpMethod::Get, url.to_string()).with_headers(&self.headers))
    }

    pub(crate) async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AzureDevOpsError> {
        Ok(self.http.execute(&request).await?)
    }
}

/// Fails with [`AzureDevOpsError::UnexpectedStatus`] unless the response is 2xx.
pub(crate) fn ensure_success(
    action: &'static str,
    target: &impl ToString,
    response: &ApiResponse,
) -> Result<(), AzureDevOpsError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(AzureDevOpsError::UnexpectedStatus {
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
) -> Result<T, AzureDevOpsError> {
    ensure_success(action, target, response)?;
    response.json().map_err(|e| AzureDevOpsError::Decode {
        action,
        target: target.to_string(),
        message: e.to_string(),
    })
}
