//! Backend trait definition

use crate::error::BackendError;
use crate::request::QueryRequest;
use crate::series::Series;

/// Source of time series the recorder reads from
///
/// Implemented by [`PrometheusClient`](crate::PrometheusClient) in production
/// and by scripted in-memory backends in tests.
pub trait Backend: Send + Sync {
    /// Returns the backend name for logging
    fn name(&self) -> &'static str;

    /// Evaluate one query
    ///
    /// # Errors
    ///
    /// Any failure to obtain a successful reply, including timeouts.
    fn fetch(
        &self,
        request: &QueryRequest,
    ) -> impl std::future::Future<Output = Result<Vec<Series>, BackendError>> + Send;
}
