//! `[log]` section
//!
//! The CLI flags (`--log-level`, `-v`, `-q`) win over `level`. Extra
//! `directives` are appended to the resulting filter so one crate can be
//! made louder without raising everything else.
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "json"
//! directives = ["sleeker_recorder=debug"]
//! ```

use std::fmt;

use serde::Deserialize;

/// Verbosity threshold
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    /// Per-series catch-up details and every increment
    Debug,
    /// New series, resets, lifecycle
    #[default]
    Info,
    /// Dropped series, failed ticks
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Console,
    /// One JSON object per event
    Json,
}

/// Logging section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default: info
    pub level: LogLevel,

    /// Default: console
    pub format: LogFormat,

    /// Additional `target=level` filter directives
    pub directives: Vec<String>,
}

impl LogConfig {
    /// Filter string for `base` (or the configured level) plus directives
    pub fn filter(&self, base: Option<&str>) -> String {
        let base = base.unwrap_or(self.level.as_str());
        std::iter::once(base)
            .chain(self.directives.iter().map(String::as_str))
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}
