//! Prometheus HTTP API client
//!
//! Issues instant and range queries against `/api/v1/query` and
//! `/api/v1/query_range`. There is no retry here: the recorder decides what a
//! failed query means for the current phase.

use std::time::Duration;

use sleeker_config::PrometheusConfig;
use tracing::{debug, error};

use crate::error::BackendError;
use crate::request::QueryRequest;
use crate::series::{Series, decode_reply, error_message};
use crate::traits::Backend;

/// Client for one Prometheus server
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    base_url: String,
    client: reqwest::Client,
}

impl PrometheusClient {
    /// Create a client for `base_url` with a per-query timeout
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails (e.g., TLS or proxy misconfiguration)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sleeker/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Init(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client from the `[prometheus]` section
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails
    pub fn from_config(config: &PrometheusConfig) -> Result<Self, BackendError> {
        Self::new(config.base_url(), config.timeout)
    }

    /// Base URL queries are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, request: &QueryRequest) -> String {
        format!("{}/api/v1/{}", self.base_url, request.endpoint())
    }
}

impl Backend for PrometheusClient {
    fn name(&self) -> &'static str {
        "prometheus"
    }

    async fn fetch(&self, request: &QueryRequest) -> Result<Vec<Series>, BackendError> {
        debug!(
            endpoint = request.endpoint(),
            query = request.query(),
            "querying prometheus"
        );

        let response = self
            .client
            .get(self.url(request))
            .query(&request.params())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body);
            error!(
                status = status.as_u16(),
                query = request.query(),
                message = %message,
                "invalid status code from prometheus"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        decode_reply(&body).inspect_err(|e| {
            error!(query = request.query(), error = %e, "invalid prometheus reply");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = PrometheusClient::new("http://prom:9090/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://prom:9090");
        assert_eq!(
            client.url(&QueryRequest::instant("x", 1.0)),
            "http://prom:9090/api/v1/query"
        );
    }

    #[test]
    fn test_from_config() {
        let client = PrometheusClient::from_config(&PrometheusConfig::default()).unwrap();
        assert_eq!(client.name(), "prometheus");
        assert_eq!(
            client.url(&QueryRequest::range("x", 0.0, 1.0, Duration::from_secs(1))),
            "http://localhost:9090/api/v1/query_range"
        );
    }
}
