//! Clip metadata handler.

use axum::extract::{Path, State};
use axum::Json;

use lclip_models::{Candidate, JobId};
use lclip_pipeline::ArtifactCache;

use crate::error::{ApiError, ApiResult};
use crate::services::ClipMeta;
use crate::state::AppState;

/// POST /api/job/:job_id/meta/:seg_id
///
/// Generates titles/hooks/hashtags for one selected clip via the local
/// model, caching per segment. Unknown job or segment is 404; model
/// failures degrade to empty metadata rather than an error.
pub async fn clip_meta(
    State(state): State<AppState>,
    Path((job_id, seg_id)): Path<(String, String)>,
) -> ApiResult<Json<ClipMeta>> {
    let id = JobId::from_string(&job_id);
    let job_dir = state.pipeline_config.job_dir(id.as_str());

    let cache = ArtifactCache::new(&job_dir);
    let highlights: Vec<Candidate> = cache
        .get_raw("highlights.json")
        .await
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| ApiError::not_found("Job has no highlights yet"))?;

    if !highlights.iter().any(|c| c.id == seg_id) {
        return Err(ApiError::not_found(format!("Unknown segment: {seg_id}")));
    }

    // The segment's caption text doubles as the prompt material.
    let transcript_text = tokio::fs::read_to_string(job_dir.join(format!("{seg_id}.srt")))
        .await
        .ok()
        .map(|srt| {
            srt.lines()
                .map(str::trim)
                .filter(|l| {
                    !l.is_empty() && !l.contains("-->") && l.parse::<u32>().is_err()
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let meta = state
        .ollama
        .clip_meta(&job_dir, &seg_id, &transcript_text)
        .await;
    Ok(Json(meta))
}
