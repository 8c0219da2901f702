//! # ecolk-api: Axum API for the Compliance Portal
//!
//! HTTP surface over the rule engine (`ecolk-rules`) and the access scope
//! resolver (`ecolk-core`). Registering a site runs the requirement
//! generator once and stores the result with the site; every site-scoped
//! read or write goes through the resolver first.
//!
//! ## API Surface
//!
//! | Prefix                               | Module                               |
//! |--------------------------------------|--------------------------------------|
//! | `/v1/organizations`                  | [`routes::organizations`]            |
//! | `/v1/sites/*`                        | [`routes::sites`]                    |
//! | `/v1/requirements/*`                 | [`routes::requirements`]             |
//! | `/v1/rules/*`                        | [`routes::rules`]                    |
//! | `/v1/sites/{id}/artifacts`, `/v1/artifacts/*` | [`routes::artifacts`]       |
//! | `/v1/sites/{id}/financial-documents` | [`routes::financial_documents`]      |
//! | `/v1/calendar/events`                | [`routes::calendar`]                 |
//! | `/v1/legal-acts/*`                   | [`routes::legal_acts`]               |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated by utoipa and served at `/openapi.json`.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the auth
/// middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::organizations::router())
        .merge(routes::sites::router())
        .merge(routes::requirements::router())
        .merge(routes::rules::router())
        .merge(routes::artifacts::router())
        .merge(routes::financial_documents::router())
        .merge(routes::calendar::router())
        .merge(routes::legal_acts::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(middleware::metrics::router())
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 503 when a configured database is unreachable.
async fn readiness(State(state): State<AppState>) -> Response {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    "ready".into_response()
}
