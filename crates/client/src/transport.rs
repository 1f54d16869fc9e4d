//! The port through which requests reach the network.
//!
//! [`RateLimitedClient`](crate::RateLimitedClient) only sees [`Transport`]; the
//! production implementation is [`ReqwestTransport`]. Tests substitute scripted
//! transports to drive the retry loop deterministically.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{ApiRequest, ApiResponse, TransportError};

/// User agent sent with every request. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("repo-admin/", env!("CARGO_PKG_VERSION"));

/// Sends one request and buffers the full response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single HTTP exchange. Implementations never retry.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the crate's user agent.
    pub fn new() -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Build {
                message: e.to_string(),
            })?;
        Ok(Self { http })
    }

    /// Wraps an existing client.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method().as_reqwest(), request.url())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| TransportError::Send {
            url: request.url().to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| TransportError::Body {
            url: request.url().to_string(),
            message: e.to_string(),
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "Received response");
        Ok(ApiResponse::new(status, headers, body))
    }
}
