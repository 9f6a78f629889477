//! Highlight retrieval handler.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;
use tracing::info;

use lclip_models::{JobId, JobSource, Transcript};
use lclip_pipeline::{digest_file, digest_hex, ArtifactCache};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/job/:job_id/highlights
///
/// Returns the cached highlight list verbatim when present. Otherwise, if
/// the source video and its transcript already exist on disk, runs the
/// selector on demand; otherwise 404.
pub async fn job_highlights(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = JobId::from_string(&job_id);
    let job_dir = state.pipeline_config.job_dir(id.as_str());

    let cache = ArtifactCache::new(&job_dir);
    if let Some(cached) = cache.get_raw("highlights.json").await {
        return Ok(Json(cached));
    }

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
    let audio = source.with_extension("wav");
    if !source.exists() || !audio.exists() {
        return Err(ApiError::not_found(
            "Video or transcript not found for this job",
        ));
    }

    let hash = digest_file(&audio).await?;
    let transcript_path = job_dir.join(format!("transcript_{hash}.json"));
    let bytes = tokio::fs::read(&transcript_path)
        .await
        .map_err(|_| ApiError::not_found("Video or transcript not found for this job"))?;
    let transcript: Transcript =
        serde_json::from_slice(&bytes).map_err(|e| ApiError::internal(e.to_string()))?;

    info!(job_id = %id, "Running on-demand highlight selection");
    let candidates = state
        .pipeline
        .select_highlights(&job, &source, &transcript)
        .await?;

    Ok(Json(serde_json::to_value(candidates).map_err(|e| {
        ApiError::internal(e.to_string())
    })?))
}
