//! Prometheus backend configuration
//!
//! Where the recorder reads both the input series and its own previously
//! exposed counters.

use serde::Deserialize;
use std::time::Duration;

/// Prometheus connection settings
///
/// # Example
///
/// ```toml
/// [prometheus]
/// url = "http://prometheus.monitoring:9090"
/// timeout = "20s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    /// Base URL of the Prometheus HTTP API (without `/api/v1`)
    /// Default: http://localhost:9090
    pub url: String,

    /// Per-query timeout, a timed out query counts as backend unavailable
    /// Default: 20s
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9090".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl PrometheusConfig {
    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
