//! Health check endpoint handler.
//!
//! Served on the access log's health-check path so health checks never show up in
//! the access log.

use axum::{Json, Router, routing::get};

use crate::api::dto::HealthResponse;
use crate::state::AppState;

/// Creates the health check route at `path`.
pub fn health_routes(path: &str) -> Router<AppState> {
    Router::new().route(path, get(health_check))
}

/// Liveness check; succeeds whenever the process can answer.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok(crate::pkg_version()))
}
