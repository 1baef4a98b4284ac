//! Error types for backend queries

use thiserror::Error;

/// Failure to complete a backend query
///
/// Every variant means "backend unavailable" to the recorder: the load phase
/// retries with backoff and the tick phase skips the metric for one cycle.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Failed to initialize the client (e.g., TLS or proxy misconfiguration)
    #[error("failed to initialize prometheus client: {0}")]
    Init(String),

    /// Connection failure, timeout or body read failure
    #[error("unable to contact the Prometheus server: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("unexpected HTTP status {status} from the Prometheus server: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error text returned by the server, if any
        message: String,
    },

    /// Reply payload carried a status other than "success"
    #[error("unexpected status '{status}' in Prometheus reply: {message}")]
    Reply {
        /// The `status` field of the reply
        status: String,
        /// The `error` field of the reply, if any
        message: String,
    },

    /// Reply could not be decoded
    #[error("invalid Prometheus reply: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the query ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
