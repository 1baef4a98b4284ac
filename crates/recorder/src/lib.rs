//! Sleeker - Recorder
//!
//! Republishes aggregated Prometheus counters as new, independently owned
//! counters that survive restarts, backend outages and input resets.
//!
//! # Overview
//!
//! ```text
//! Recorder ──► reconcile (per metric, concurrent) ──► commit all or nothing
//!    │
//!    └──► every interval: tick (per metric, concurrent) ──► commit per metric
//! ```
//!
//! - [`reconcile`] restores each derived series at startup from its last
//!   exposed value plus whatever the input gained since.
//! - [`tick`] adds per-interval increases, treating decreases as resets.
//! - [`Recorder`] runs both with retry, drift correction and cancellation.
//!
//! Derived counters are exposed through an [`Exposition`] registry which the
//! binary serves over HTTP.

mod error;
mod exposition;
mod metric;
mod previous;
mod query;
mod recorder;
mod schedule;
mod spec;
mod stats;

pub mod reconcile;
pub mod tick;

#[cfg(test)]
mod test_support;


#[cfg(test)]
mod tick_test;


pub use error::{RecorderError, Result};
pub use exposition::{DerivedCounter, Exposition};
pub use metric::Metric;
pub use previous::PreviousValueTable;
pub use query::{aggregation_query, liveness_query, recatch_query};
pub use reconcile::{CatchupWindow, LoadPlan, PlannedSeries, catchup};
pub use recorder::{Recorder, RecorderSettings};
pub use schedule::{Deadline, Schedule, unix_now};
pub use spec::{LabelKey, MetricSpec, Selector};
pub use stats::RecorderStats;
pub use tick::TickSummary;
