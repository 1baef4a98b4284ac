//! Configuration validation
//!
//! Validates config consistency:
//! - At least one metric is declared
//! - Required metric fields are present and shaped like PromQL identifiers
//! - No two metrics publish the same output counter
//! - Scheduler timings are usable and catch-up queries fit the point limit
//! - The Prometheus URL looks like an HTTP URL
//!
//! Nothing here checks that an aggregation expression makes sense, only its
//! shape.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::metrics::MetricConfig;
use crate::scheduler::MAX_POINTS_PER_SERIES;

static METRIC_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").unwrap());
static LABEL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_metrics(&config.metrics)?;
    validate_scheduler(config)?;
    validate_prometheus(config)?;
    Ok(())
}

/// Validate every metric and the uniqueness of their outputs
fn validate_metrics(metrics: &[MetricConfig]) -> Result<()> {
    if metrics.is_empty() {
        return Err(ConfigError::NoMetrics);
    }

    let mut outputs = HashSet::new();
    for metric in metrics {
        validate_metric(metric)?;

        let output = metric.output_name();
        if !outputs.insert(output.clone()) {
            return Err(ConfigError::duplicate_output(output));
        }
    }

    Ok(())
}

/// Validate a single metric declaration
fn validate_metric(metric: &MetricConfig) -> Result<()> {
    if metric.output.trim().is_empty() {
        return Err(ConfigError::missing_field("metric", &metric.input, "output"));
    }

    let name = metric.output.as_str();

    if metric.input.trim().is_empty() {
        return Err(ConfigError::missing_field("metric", name, "input"));
    }

    if !METRIC_NAME.is_match(name) {
        return Err(ConfigError::invalid_value(
            "metric",
            name,
            "output",
            "must be a valid Prometheus metric name",
        ));
    }

    let mut seen = HashSet::new();
    for label in &metric.aggregation_labels {
        if !LABEL_NAME.is_match(label) {
            return Err(ConfigError::invalid_value(
                "metric",
                name,
                "aggregation_labels",
                format!("'{}' is not a valid label name", label),
            ));
        }
        if !seen.insert(label.as_str()) {
            return Err(ConfigError::invalid_value(
                "metric",
                name,
                "aggregation_labels",
                format!("label '{}' is listed twice", label),
            ));
        }
    }

    if !LABEL_NAME.is_match(&metric.aggregation_operation) {
        return Err(ConfigError::invalid_value(
            "metric",
            name,
            "aggregation_operation",
            format!(
                "'{}' is not an aggregation operator",
                metric.aggregation_operation
            ),
        ));
    }

    if let Some(filtering) = &metric.filtering {
        let filtering = filtering.trim();
        if !filtering.is_empty() && !(filtering.starts_with('{') && filtering.ends_with('}')) {
            return Err(ConfigError::invalid_value(
                "metric",
                name,
                "filtering",
                "must be a label selector such as {job=\"api\"}",
            ));
        }
    }

    Ok(())
}

/// Validate scheduler timings
fn validate_scheduler(config: &Config) -> Result<()> {
    let scheduler = &config.scheduler;

    if scheduler.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "scheduler",
            "scheduler",
            "interval",
            "must be greater than zero",
        ));
    }

    if scheduler.catchup_step.is_zero() {
        return Err(ConfigError::invalid_value(
            "scheduler",
            "scheduler",
            "catchup_step",
            "must be greater than zero",
        ));
    }

    if scheduler.catchup_window < scheduler.catchup_step {
        return Err(ConfigError::invalid_value(
            "scheduler",
            "scheduler",
            "catchup_window",
            "must be at least one catchup_step long",
        ));
    }

    let points = scheduler.catchup_points();
    if points > MAX_POINTS_PER_SERIES {
        return Err(ConfigError::invalid_value(
            "scheduler",
            "scheduler",
            "catchup_window",
            format!(
                "{} points per series exceeds the Prometheus limit of {}",
                points, MAX_POINTS_PER_SERIES
            ),
        ));
    }

    Ok(())
}

/// Validate backend connection settings
fn validate_prometheus(config: &Config) -> Result<()> {
    let url = config.prometheus.url.trim();

    if url.is_empty() {
        return Err(ConfigError::missing_field("prometheus", "prometheus", "url"));
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::invalid_value(
            "prometheus",
            "prometheus",
            "url",
            "must start with http:// or https://",
        ));
    }

    if config.prometheus.timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "prometheus",
            "prometheus",
            "timeout",
            "must be greater than zero",
        ));
    }

    Ok(())
}
