//! The GET seam between request construction and the network.
//!
//! [`HttpTransport`] is the production implementation. Anything implementing
//! [`Transport`] can stand in for it, which is how tests observe the exact
//! URLs a client sends without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::error::{ApiError, redact_url};
use crate::user_agent;

/// Default API connect timeout (10 seconds).
pub const API_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default API read timeout (30 seconds).
pub const API_READ_TIMEOUT_SECS: u64 = 30;

/// Performs one GET and returns the response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns the body text.
    ///
    /// Implementations report failures to reach the endpoint as transport
    /// errors. They never inspect the body for the API error sentinel.
    async fn get(&self, url: &Url) -> Result<String, ApiError>;
}

/// Transport over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the default API timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeouts(API_CONNECT_TIMEOUT_SECS, API_READ_TIMEOUT_SECS)
    }

    /// Creates a transport with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent::default_api_user_agent())
            .gzip(true)
            .build()
            .map_err(|e| ApiError::ClientBuild {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(url = %redact_url(url)))]
    async fn get(&self, url: &Url) -> Result<String, ApiError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::timeout(url)
            } else {
                ApiError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http_status(url, status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::timeout(url)
            } else {
                ApiError::network(url, e)
            }
        })?;

        debug!(status = status.as_u16(), body_len = body.len(), "API response received");
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_builds_with_defaults() {
        assert!(HttpTransport::new().is_ok());
    }

    #[tokio::test]
    async fn test_http_transport_unreachable_host_is_network_error() {
        let transport = HttpTransport::with_timeouts(1, 1).unwrap();
        // Port 9 (discard) on localhost is almost never listening.
        let url = Url::parse("http://127.0.0.1:9/cgi-bin/rsapi.cgi?sub=x&cookie=SECRET").unwrap();
        let err = transport.get(&url).await.unwrap_err();
        assert!(
            matches!(err, ApiError::Network { .. } | ApiError::Timeout { .. }),
            "got {err:?}"
        );
        assert!(!err.to_string().contains("SECRET"), "cookie leaked: {err}");
    }
}
