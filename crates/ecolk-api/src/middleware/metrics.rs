//! # Prometheus Metrics
//!
//! Request counting through the `metrics` facade. The binary installs a
//! `metrics-exporter-prometheus` recorder and stores its handle in
//! [`AppState`]; without a recorder the counters are no-ops and
//! `/metrics` answers 404.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Counter of handled HTTP requests, labelled by status code.
pub const HTTP_REQUESTS_TOTAL: &str = "ecolk_http_requests_total";

/// Counter of requirements produced by site registration.
pub const REQUIREMENTS_GENERATED_TOTAL: &str = "ecolk_requirements_generated_total";

/// Middleware that counts every response by status.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    metrics::counter!(HTTP_REQUESTS_TOTAL, "status" => response.status().as_u16().to_string())
        .increment(1);
    response
}

/// Record that `count` requirements were generated for a new site.
pub fn record_generated(count: usize) {
    metrics::counter!(REQUIREMENTS_GENERATED_TOTAL).increment(count as u64);
}

/// Build the metrics router. Mounted outside authentication.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(render_metrics))
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
