//! Recorder error types

use sleeker_backend::BackendError;
use thiserror::Error;

/// Errors raised by the reconciliation and tick engine
#[derive(Debug, Error)]
pub enum RecorderError {
    /// A query for one derived metric failed
    #[error("backend query for {metric} failed: {source}")]
    Backend {
        /// Output name of the metric
        metric: String,
        /// Underlying query failure
        #[source]
        source: BackendError,
    },

    /// A derived counter could not be registered for exposition
    #[error("exposition error: {0}")]
    Exposition(#[from] prometheus::Error),

    /// Startup was interrupted before the load committed
    #[error("cancelled before the initial load completed")]
    Cancelled,
}

impl RecorderError {
    /// Attach the failing metric's output name to a backend error
    pub fn backend(metric: impl Into<String>, source: BackendError) -> Self {
        Self::Backend {
            metric: metric.into(),
            source,
        }
    }

    /// Whether this error is transient and worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Whether a backend query ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Backend { source, .. } if source.is_timeout())
    }
}

/// Result type for recorder operations
pub type Result<T> = std::result::Result<T, RecorderError>;
