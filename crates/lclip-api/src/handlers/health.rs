//! Health endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub workers_alive: usize,
    pub worker_panics: usize,
    pub jobs: usize,
}

/// GET /health
///
/// Degrades to 503 when the worker pool has died; job panics are counted
/// but are not themselves unhealthy.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.worker_health.is_healthy();
    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        workers_alive: state.worker_health.alive(),
        worker_panics: state.worker_health.panics(),
        jobs: state.registry.len().await,
    };
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
