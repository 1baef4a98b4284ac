//! Steady-state phase: one instant read per interval
//!
//! Each tick reads the aggregated input, compares every series with the last
//! value seen for it, and adds the difference to the derived counter. A
//! decrease means the input counter restarted, in which case the whole new
//! value is added.

use sleeker_backend::{Backend, QueryRequest};
use tracing::{debug, info, warn};

use crate::error::{RecorderError, Result};
use crate::metric::Metric;
use crate::query::aggregation_query;

/// What one tick did to a metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Series whose counter was incremented
    pub updated: usize,
    /// Series seen for the first time
    pub new_series: usize,
    /// Series whose input counter was reset
    pub resets: usize,
    /// Rows without a usable value
    pub skipped: usize,
}

/// Read `metric`'s input at `timestamp` and apply increments
///
/// Each series is committed as soon as it is processed: the counter is
/// incremented first, then the input value is recorded as previous.
///
/// # Errors
///
/// Returns [`RecorderError::Backend`] if the query fails. Nothing is
/// mutated in that case.
pub async fn tick<B: Backend>(
    metric: &mut Metric,
    backend: &B,
    timestamp: f64,
) -> Result<TickSummary> {
    let request = QueryRequest::instant(aggregation_query(&metric.spec), timestamp);
    let rows = backend
        .fetch(&request)
        .await
        .map_err(|e| RecorderError::backend(metric.spec.output(), e))?;

    let mut summary = TickSummary::default();

    for row in &rows {
        let key = metric.spec.key(row);

        let value = match row.value {
            Some(sample) if sample.value.is_finite() => sample.value,
            Some(sample) => {
                warn!(
                    series = %metric.spec.selector(&key),
                    value = sample.value,
                    "non-finite base value, skipping"
                );
                summary.skipped += 1;
                continue;
            }
            None => {
                warn!(series = %metric.spec.selector(&key), "no base value, skipping");
                summary.skipped += 1;
                continue;
            }
        };

        let increment = match metric.previous.get(&key) {
            None => {
                info!(
                    series = %metric.spec.selector(&key),
                    value,
                    "new series found, starting counter"
                );
                summary.new_series += 1;
                value
            }
            Some(previous) if value < previous => {
                info!(
                    series = %metric.spec.selector(&key),
                    previous,
                    value,
                    "reset found on base counter"
                );
                summary.resets += 1;
                value
            }
            Some(previous) => value - previous,
        };

        if metric.counter.increment(&key, increment) {
            debug!(series = %metric.spec.selector(&key), increment, "counter incremented");
            metric.previous.record(key, value);
            summary.updated += 1;
        }
    }

    Ok(summary)
}
