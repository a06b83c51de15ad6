//! Stockroom API library.
//!
//! The HTTP backend of the Stockroom inventory and point-of-sale system,
//! exposed as a library so the CLI and tests can reuse its repositories,
//! services and configuration.
//!
//! # Modules
//!
//! - [`config`] - environment configuration
//! - [`db`] - `PostgreSQL` repositories and migrations
//! - [`services`] - login, checkout and PDF receipts
//! - [`routes`] - axum handlers under `/api`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::{Router, routing::get};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the application router: health checks, the `/api` tree, CORS and
/// request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);
    let trust_proxy = state.config().trust_proxy;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", routes::routes(trust_proxy))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// CORS for the configured origins. Origins that are not valid header
/// values are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
