//! Reply model
//!
//! Decodes the Prometheus HTTP API envelope:
//!
//! ```json
//! {"status": "success",
//!  "data": {"resultType": "matrix",
//!           "result": [{"metric": {"a": "1"}, "values": [[100000, "20"]]}]}}
//! ```
//!
//! Instant queries carry `value` (one pair) instead of `values`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::BackendError;

/// One `(timestamp, value)` point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Unix seconds
    pub timestamp: f64,
    /// Sample value
    pub value: f64,
}

impl Sample {
    /// Create a sample
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One row of a query reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// Label set identifying the series
    pub labels: HashMap<String, String>,
    /// Instant query point, if any
    pub value: Option<Sample>,
    /// Range query points, oldest first
    pub values: Vec<Sample>,
}

impl Series {
    /// Value of `name`, or the empty string when the label is absent
    pub fn label(&self, name: &str) -> &str {
        self.labels.get(name).map(String::as_str).unwrap_or("")
    }

    /// Newest range point with a finite value
    pub fn last(&self) -> Option<Sample> {
        self.values
            .iter()
            .rev()
            .find(|sample| sample.value.is_finite())
            .copied()
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Option<Data>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(default)]
    result: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    metric: HashMap<String, String>,
    #[serde(default)]
    value: Option<(f64, String)>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

fn parse_sample((timestamp, raw): (f64, String)) -> Result<Sample, BackendError> {
    raw.parse::<f64>()
        .map(|value| Sample::new(timestamp, value))
        .map_err(|_| BackendError::Decode(format!("invalid sample value '{}'", raw)))
}

/// Decode a reply body into series
pub fn decode_reply(body: &[u8]) -> Result<Vec<Series>, BackendError> {
    let envelope: Envelope = serde_json::from_slice(body)?;

    if envelope.status != "success" {
        return Err(BackendError::Reply {
            status: envelope.status,
            message: envelope.error.unwrap_or_default(),
        });
    }

    let data = envelope
        .data
        .ok_or_else(|| BackendError::Decode("missing data field".to_string()))?;

    data.result
        .into_iter()
        .map(|raw| {
            Ok(Series {
                labels: raw.metric,
                value: raw.value.map(parse_sample).transpose()?,
                values: raw
                    .values
                    .into_iter()
                    .map(parse_sample)
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect()
}

/// Extract the `error` field of a failed reply, falling back to the raw body
pub(crate) fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<Envelope>(body) {
        Ok(Envelope {
            error: Some(error), ..
        }) => error,
        _ => {
            let text = String::from_utf8_lossy(body);
            text.chars().take(512).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_matrix() {
        let body = br#"{
            "status": "success",
            "data": {
                "resultType": "matrix",
                "result": [{
                    "metric": {"__name__": "output_metric_1", "a": "1", "b": "foo"},
                    "values": [[100000, "20"], [100005, "21"]]
                }]
            }
        }"#;
        let series = decode_reply(body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label("a"), "1");
        assert_eq!(series[0].label("missing"), "");
        assert_eq!(series[0].values.len(), 2);
        assert_eq!(series[0].last(), Some(Sample::new(100005.0, 21.0)));
        assert!(series[0].value.is_none());
    }

    #[test]
    fn test_decode_vector() {
        let body = br#"{
            "status": "success",
            "data": {
                "resultType": "vector",
                "result": [{"metric": {"a": "1"}, "value": [100000.123, "20.5"]}]
            }
        }"#;
        let series = decode_reply(body).unwrap();
        assert_eq!(series[0].value, Some(Sample::new(100000.123, 20.5)));
        assert!(series[0].values.is_empty());
    }

    #[test]
    fn test_decode_special_values() {
        let body = br#"{
            "status": "success",
            "data": {"resultType": "vector", "result": [
                {"metric": {}, "value": [1, "NaN"]},
                {"metric": {}, "value": [1, "+Inf"]}
            ]}
        }"#;
        let series = decode_reply(body).unwrap();
        assert!(series[0].value.unwrap().value.is_nan());
        assert!(series[1].value.unwrap().value.is_infinite());
    }

    #[test]
    fn test_last_skips_non_finite_points() {
        let body = br#"{
            "status": "success",
            "data": {"resultType": "matrix", "result": [
                {"metric": {}, "values": [[100000, "20"], [100005, "21"], [100010, "NaN"]]},
                {"metric": {}, "values": [[100000, "NaN"], [100005, "+Inf"]]}
            ]}
        }"#;
        let series = decode_reply(body).unwrap();
        assert_eq!(series[0].last(), Some(Sample::new(100005.0, 21.0)));
        assert_eq!(series[1].last(), None);
    }

    #[test]
    fn test_decode_empty_result() {
        let body = br#"{"status": "success", "data": {"resultType": "matrix", "result": []}}"#;
        assert!(decode_reply(body).unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_status() {
        let body = br#"{"status": "error", "errorType": "bad_data", "error": "parse error"}"#;
        match decode_reply(body) {
            Err(BackendError::Reply { status, message }) => {
                assert_eq!(status, "error");
                assert_eq!(message, "parse error");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_invalid_sample() {
        let body = br#"{"status": "success", "data": {"result": [
            {"metric": {}, "value": [1, "twenty"]}
        ]}}"#;
        assert!(matches!(decode_reply(body), Err(BackendError::Decode(_))));
    }

    #[test]
    fn test_decode_not_json() {
        assert!(matches!(decode_reply(b"<html>"), Err(BackendError::Decode(_))));
    }

    #[test]
    fn test_error_message() {
        let body = br#"{"status": "error", "error": "query timed out"}"#;
        assert_eq!(error_message(body), "query timed out");
        assert_eq!(error_message(b"bad gateway"), "bad gateway");
    }
}
