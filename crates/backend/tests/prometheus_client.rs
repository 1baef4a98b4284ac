//! Integration tests for the Prometheus client
//!
//! Each test serves a fake Prometheus API on an ephemeral local port.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use sleeker_backend::{Backend, BackendError, PrometheusClient, QueryRequest, Sample};
use tokio::net::TcpListener;

/// Serve `app` on 127.0.0.1 and return the bound address
async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, timeout: Duration) -> PrometheusClient {
    PrometheusClient::new(format!("http://{}", addr), timeout).unwrap()
}

/// Echo the received parameters back as labels of a single series
async fn echo_instant(Query(params): Query<HashMap<String, String>>) -> String {
    let labels = serde_json::to_string(&params).unwrap();
    format!(
        r#"{{"status":"success","data":{{"resultType":"vector","result":[{{"metric":{},"value":[100015,"20"]}}]}}}}"#,
        labels
    )
}

async fn echo_range(Query(params): Query<HashMap<String, String>>) -> String {
    let labels = serde_json::to_string(&params).unwrap();
    format!(
        r#"{{"status":"success","data":{{"resultType":"matrix","result":[{{"metric":{},"values":[[100000,"3"],[100005,"4"]]}}]}}}}"#,
        labels
    )
}

#[tokio::test]
async fn test_instant_query_round_trip() {
    let app = Router::new().route("/api/v1/query", get(echo_instant));
    let addr = serve(app).await;

    let query = r#"sum by (a, b) (base_metric_1{job="x"})"#;
    let rows = client(addr, Duration::from_secs(5))
        .fetch(&QueryRequest::instant(query, 100015.0))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    // Parameters survive URL encoding untouched
    assert_eq!(rows[0].label("query"), query);
    assert_eq!(rows[0].label("time"), "100015");
    assert_eq!(rows[0].value, Some(Sample::new(100015.0, 20.0)));
}

#[tokio::test]
async fn test_range_query_round_trip() {
    let app = Router::new().route("/api/v1/query_range", get(echo_range));
    let addr = serve(app).await;

    let rows = client(addr, Duration::from_secs(5))
        .fetch(&QueryRequest::range(
            "output_metric_1_total",
            78415.0,
            100015.0,
            Duration::from_secs(15),
        ))
        .await
        .unwrap();

    assert_eq!(rows[0].label("start"), "78415");
    assert_eq!(rows[0].label("end"), "100015");
    assert_eq!(rows[0].label("step"), "15");
    assert_eq!(
        rows[0].values,
        vec![Sample::new(100000.0, 3.0), Sample::new(100005.0, 4.0)]
    );
}

#[tokio::test]
async fn test_http_error_status() {
    let app = Router::new().route(
        "/api/v1/query",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                r#"{"status":"error","errorType":"unavailable","error":"tsdb not ready"}"#,
            )
        }),
    );
    let addr = serve(app).await;

    let err = client(addr, Duration::from_secs(5))
        .fetch(&QueryRequest::instant("up", 1.0))
        .await
        .unwrap_err();

    match err {
        BackendError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "tsdb not ready");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_in_payload() {
    let app = Router::new().route(
        "/api/v1/query",
        get(|| async { r#"{"status":"error","error":"bad query"}"# }),
    );
    let addr = serve(app).await;

    let err = client(addr, Duration::from_secs(5))
        .fetch(&QueryRequest::instant("up(", 1.0))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Reply { .. }));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let app = Router::new().route(
        "/api/v1/query",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            r#"{"status":"success","data":{"result":[]}}"#
        }),
    );
    let addr = serve(app).await;

    let err = client(addr, Duration::from_millis(100))
        .fetch(&QueryRequest::instant("up", 1.0))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_connection_refused() {
    // Reserve a port then release it so nothing listens there
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, Duration::from_secs(1))
        .fetch(&QueryRequest::instant("up", 1.0))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Http(_)));
}
