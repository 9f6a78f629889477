//! API routes.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::health::health;
use crate::handlers::highlights::job_highlights;
use crate::handlers::jobs::{job_from_file, job_from_url, job_status};
use crate::handlers::meta::clip_meta;
use crate::handlers::presets::list_presets;
use crate::handlers::render::{job_result, render_job};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/job/from_url", post(job_from_url))
        .route("/job/from_file", post(job_from_file))
        .route("/job/:job_id", get(job_status))
        .route("/job/:job_id/highlights", get(job_highlights))
        .route("/job/:job_id/meta/:seg_id", post(clip_meta))
        .route("/job/:job_id/render", post(render_job))
        .route("/job/:job_id/result", get(job_result))
        .route("/presets", get(list_presets));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
