//! Exposition HTTP server
//!
//! Serves `/metrics` (Prometheus text format) and `/health`. Started before
//! the initial load so the process can be scraped while it retries.

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use sleeker_config::ExporterConfig;
use sleeker_recorder::Exposition;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Routes of the exposition endpoint
pub fn router(exposition: Exposition) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(exposition)
}

/// Bind the exposition endpoint and serve it until `cancel` fires
pub async fn start(
    config: &ExporterConfig,
    exposition: Exposition,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind exporter on {}", addr))?;

    info!(addr = %addr, "exporter listening");

    let app = router(exposition);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
            })
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "exporter error");
            });
    });

    Ok(handle)
}

/// GET /metrics
async fn metrics_handler(State(exposition): State<Exposition>) -> Response {
    match exposition.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, exposition.content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /health
async fn health_handler() -> &'static str {
    "ok"
}
