//! Query requests
//!
//! A request is either an instant query evaluated at one timestamp or a
//! range query evaluated at fixed steps over a window. Timestamps are unix
//! seconds, as the Prometheus HTTP API expects.

use std::time::Duration;

/// One PromQL evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    /// `/api/v1/query`: one sample per series
    Instant {
        /// PromQL expression
        query: String,
        /// Evaluation timestamp
        time: f64,
    },
    /// `/api/v1/query_range`: a list of samples per series
    Range {
        /// PromQL expression
        query: String,
        /// First evaluation timestamp
        start: f64,
        /// Last evaluation timestamp
        end: f64,
        /// Resolution
        step: Duration,
    },
}

impl QueryRequest {
    /// Build an instant query
    pub fn instant(query: impl Into<String>, time: f64) -> Self {
        Self::Instant {
            query: query.into(),
            time,
        }
    }

    /// Build a range query
    pub fn range(query: impl Into<String>, start: f64, end: f64, step: Duration) -> Self {
        Self::Range {
            query: query.into(),
            start,
            end,
            step,
        }
    }

    /// The PromQL expression
    pub fn query(&self) -> &str {
        match self {
            Self::Instant { query, .. } | Self::Range { query, .. } => query,
        }
    }

    /// API path relative to `/api/v1/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Instant { .. } => "query",
            Self::Range { .. } => "query_range",
        }
    }

    /// URL query parameters
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Instant { query, time } => {
                vec![("query", query.clone()), ("time", time.to_string())]
            }
            Self::Range {
                query,
                start,
                end,
                step,
            } => vec![
                ("query", query.clone()),
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("step", step.as_secs_f64().to_string()),
            ],
        }
    }
}
