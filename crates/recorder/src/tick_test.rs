//! Tests for the steady-state tick

use sleeker_backend::QueryRequest;

use crate::test_support::{ScriptedBackend, empty_row, instant_row};
use crate::tick::tick;
use crate::{Exposition, LabelKey, LoadPlan, Metric, MetricSpec, PlannedSeries, TickSummary};

const INPUT: &str = "sum by (a, b) (base_metric_3)";
const OUTPUT: &str = "output_metric_3_total";
const LABELS: &[(&str, &str)] = &[("a", "1"), ("b", "foo")];

fn setup() -> (Exposition, Metric) {
    let exposition = Exposition::new();
    let spec = MetricSpec::new("base_metric_3", "output_metric_3")
        .with_description("Lorem ipsum")
        .with_labels(["a", "b"]);
    let metric = Metric::register(spec, &exposition).unwrap();
    (exposition, metric)
}

fn reading(value: f64) -> Vec<sleeker_backend::Series> {
    vec![instant_row(
        &[
            ("__name__", "base_metric_3"),
            ("a", "1"),
            ("b", "foo"),
            ("dummy_label", "my_dummy_label_value"),
        ],
        100000.0,
        value,
    )]
}

fn key() -> LabelKey {
    LabelKey::new(["1", "foo"])
}

#[tokio::test]
async fn test_new_series_then_unchanged() {
    let (exposition, mut metric) = setup();
    let backend = ScriptedBackend::new();
    backend.rows(INPUT, reading(20.0));

    let first = tick(&mut metric, &backend, 100015.0).await.unwrap();
    let second = tick(&mut metric, &backend, 100015.0).await.unwrap();

    assert_eq!(exposition.value(OUTPUT, LABELS), Some(20.0));
    assert_eq!(first.new_series, 1);
    assert_eq!(second.new_series, 0);
    assert_eq!(second.updated, 1);
    assert_eq!(metric.previous().get(&key()), Some(20.0));
}

#[tokio::test]
async fn test_increase_is_added() {
    let (exposition, mut metric) = setup();
    let backend = ScriptedBackend::new();
    backend.rows(INPUT, reading(20.0)).rows(INPUT, reading(25.0));

    tick(&mut metric, &backend, 100015.0).await.unwrap();
    tick(&mut metric, &backend, 100020.0).await.unwrap();

    assert_eq!(exposition.value(OUTPUT, LABELS), Some(25.0));
}

#[tokio::test]
async fn test_reset_adds_new_value() {
    let (exposition, mut metric) = setup();
    let backend = ScriptedBackend::new();
    backend
        .rows(INPUT, reading(20.0))
        .rows(INPUT, reading(25.0))
        .rows(INPUT, reading(3.0));

    tick(&mut metric, &backend, 100015.0).await.unwrap();
    tick(&mut metric, &backend, 100020.0).await.unwrap();
    let summary = tick(&mut metric, &backend, 100025.0).await.unwrap();

    assert_eq!(summary.resets, 1);
    assert_eq!(exposition.value(OUTPUT, LABELS), Some(28.0));
    assert_eq!(metric.previous().get(&key()), Some(3.0));
}

#[tokio::test]
async fn test_primed_series_continues_from_load() {
    let (exposition, mut metric) = setup();
    metric.commit(LoadPlan {
        series: vec![PlannedSeries {
            key: key(),
            increment: 23.0,
            previous_input: Some(2.0),
        }],
    });

    let backend = ScriptedBackend::new();
    backend.rows(INPUT, reading(5.0));
    let summary = tick(&mut metric, &backend, 100020.0).await.unwrap();

    assert_eq!(summary.new_series, 0);
    assert_eq!(exposition.value(OUTPUT, LABELS), Some(26.0));
}

#[tokio::test]
async fn test_previous_zero_is_not_a_new_series() {
    let (exposition, mut metric) = setup();
    let backend = ScriptedBackend::new();
    backend.rows(INPUT, reading(0.0)).rows(INPUT, reading(4.0));

    tick(&mut metric, &backend, 100015.0).await.unwrap();
    let summary = tick(&mut metric, &backend, 100020.0).await.unwrap();

    assert_eq!(summary.new_series, 0);
    assert_eq!(summary.resets, 0);
    assert_eq!(exposition.value(OUTPUT, LABELS), Some(4.0));
}

#[tokio::test]
async fn test_rows_without_usable_value_are_skipped() {
    let (exposition, mut metric) = setup();
    let backend = ScriptedBackend::new();
    backend.rows(
        INPUT,
        vec![
            empty_row(LABELS),
            instant_row(&[("a", "2"), ("b", "foo")], 100000.0, f64::NAN),
            instant_row(&[("a", "3"), ("b", "foo")], 100000.0, f64::INFINITY),
            instant_row(&[("a", "4"), ("b", "foo")], 100000.0, 9.0),
        ],
    );

    let summary = tick(&mut metric, &backend, 100015.0).await.unwrap();

    assert_eq!(
        summary,
        TickSummary {
            updated: 1,
            new_series: 1,
            resets: 0,
            skipped: 3,
        }
    );
    assert_eq!(exposition.value(OUTPUT, LABELS), None);
    assert_eq!(exposition.value(OUTPUT, &[("a", "4"), ("b", "foo")]), Some(9.0));
    assert_eq!(metric.previous().len(), 1);
}

#[tokio::test]
async fn test_failure_mutates_nothing() {
    let (exposition, mut metric) = setup();
    let backend = ScriptedBackend::new();
    backend
        .rows(INPUT, reading(20.0))
        .fail(INPUT)
        .rows(INPUT, reading(30.0));

    tick(&mut metric, &backend, 100015.0).await.unwrap();
    assert!(tick(&mut metric, &backend, 100020.0).await.is_err());
    assert_eq!(exposition.value(OUTPUT, LABELS), Some(20.0));
    assert_eq!(metric.previous().get(&key()), Some(20.0));

    // The next successful read picks up the whole increase
    tick(&mut metric, &backend, 100025.0).await.unwrap();
    assert_eq!(exposition.value(OUTPUT, LABELS), Some(30.0));
}

#[tokio::test]
async fn test_instant_query_at_timestamp() {
    let (_exposition, mut metric) = setup();
    let backend = ScriptedBackend::new();

    tick(&mut metric, &backend, 100015.0).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].1, QueryRequest::instant(INPUT, 100015.0));
}
