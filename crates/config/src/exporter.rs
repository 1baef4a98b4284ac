//! Exposition endpoint configuration

use serde::Deserialize;

/// HTTP endpoint serving the derived counters
///
/// # Example
///
/// ```toml
/// [exporter]
/// host = "0.0.0.0"   # default
/// port = 6200        # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Host to bind to
    /// Default: "0.0.0.0"
    pub host: String,

    /// Port to listen on
    /// Default: 6200
    pub port: u16,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6200,
        }
    }
}

impl ExporterConfig {
    /// `host:port` string suitable for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
