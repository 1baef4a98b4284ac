//! Sleeker - Backend
//!
//! Read access to a Prometheus-compatible time-series backend.
//!
//! # Overview
//!
//! The recorder needs exactly one operation from the backend: evaluate a
//! PromQL query and return the rows it produced. That operation is the
//! [`Backend`] trait; [`PrometheusClient`] implements it over the Prometheus
//! HTTP API.
//!
//! # Example
//!
//! ```ignore
//! use sleeker_backend::{Backend, PrometheusClient, QueryRequest};
//! use std::time::Duration;
//!
//! let client = PrometheusClient::new("http://localhost:9090", Duration::from_secs(20))?;
//! let rows = client
//!     .fetch(&QueryRequest::instant("sum by (job) (up)", 1_700_000_000.0))
//!     .await?;
//! ```

mod client;
mod error;
mod request;
mod series;
mod traits;

pub use client::PrometheusClient;
pub use error::BackendError;
pub use request::QueryRequest;
pub use series::{Sample, Series, decode_reply};
pub use traits::Backend;
