//! Rendering and result handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use lclip_media::{render_segments, RenderFormat, RenderOptions};
use lclip_models::{Candidate, JobId, JobSource};
use lclip_pipeline::digest_hex;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenderSegmentRequest {
    pub id: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub captions: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub segments: Vec<RenderSegmentRequest>,
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_resolution() -> u32 {
    720
}

fn default_format() -> String {
    "mp4".to_string()
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub outputs: Vec<String>,
}

/// POST /api/job/:job_id/render
pub async fn render_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(req): Json<RenderRequest>,
) -> ApiResult<Json<RenderResponse>> {
    if req.segments.is_empty() {
        return Err(ApiError::bad_request("no segments to render"));
    }
    let format: RenderFormat = req
        .format
        .parse()
        .map_err(|_| ApiError::bad_request(format!("unsupported format: {}", req.format)))?;

    let id = JobId::from_string(&job_id);
    let job = state
        .registry
        .job(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let source = match &job.source {
        JobSource::LocalFile(path) => path.clone(),
        JobSource::Url(url) => state
            .pipeline_config
            .source_dir
            .join(format!("{}.mp4", digest_hex(url.as_bytes()))),
    };
    if !source.exists() {
        return Err(ApiError::not_found("Source video not found"));
    }

    let job_dir = state.pipeline_config.job_dir(id.as_str());
    info!(job_id = %id, segments = req.segments.len(), "Rendering clips");

    let mut outputs = Vec::new();
    for seg in &req.segments {
        if seg.end <= seg.start {
            return Err(ApiError::bad_request(format!(
                "segment {} has non-positive duration",
                seg.id
            )));
        }
        let mut candidate = Candidate::from_interval(seg.start, seg.end);
        candidate.id = seg.id.clone();

        let options = RenderOptions {
            resolution: req.resolution,
            format,
            captions: seg.captions.unwrap_or(true),
        };
        let rendered = render_segments(
            id.as_str(),
            &source,
            &job_dir,
            &state.pipeline_config.outputs_dir,
            std::slice::from_ref(&candidate),
            &options,
        )
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
        outputs.extend(rendered.into_iter().map(|p| p.display().to_string()));
    }

    Ok(Json(RenderResponse { outputs }))
}

/// GET /api/job/:job_id/result
///
/// Lists rendered outputs for the job.
pub async fn job_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<RenderResponse>> {
    let prefix = format!("{job_id}_");
    let mut outputs = Vec::new();

    let mut entries = match tokio::fs::read_dir(&state.pipeline_config.outputs_dir).await {
        Ok(entries) => entries,
        Err(_) => return Ok(Json(RenderResponse { outputs })),
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&prefix) {
            outputs.push(entry.path().display().to_string());
        }
    }
    outputs.sort();

    Ok(Json(RenderResponse { outputs }))
}
