//! Job submission and status handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use lclip_models::{AspectRatio, Job, JobConfig, JobId, JobStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobFromUrlRequest {
    pub url: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub max_clips: Option<usize>,
    #[serde(default)]
    pub clip_len: Option<u32>,
    #[serde(default)]
    pub style_preset: Option<String>,
    #[serde(default)]
    pub aspect: Option<String>,
    #[serde(default)]
    pub emojis: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct JobCreatedResponse {
    pub job_id: JobId,
}

fn parse_config(
    lang: Option<String>,
    max_clips: Option<usize>,
    clip_len: Option<u32>,
    style_preset: Option<String>,
    aspect: Option<String>,
    emojis: Option<bool>,
) -> ApiResult<JobConfig> {
    let aspect = match aspect {
        Some(s) => s
            .parse::<AspectRatio>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => AspectRatio::default(),
    };
    Ok(JobConfig {
        lang,
        max_clips,
        clip_len,
        style_preset,
        aspect,
        emojis: emojis.unwrap_or(true),
    })
}

async fn submit(state: &AppState, job: Job) -> ApiResult<JobCreatedResponse> {
    let job_id = job.id.clone();
    state.registry.insert(job.clone()).await;
    state
        .status_store
        .persist(&job_id, &JobStatus::queued())
        .await;
    state.queue.enqueue(job)?;

    info!(job_id = %job_id, "Job submitted");
    Ok(JobCreatedResponse { job_id })
}

/// POST /api/job/from_url
pub async fn job_from_url(
    State(state): State<AppState>,
    Json(req): Json<JobFromUrlRequest>,
) -> ApiResult<Json<JobCreatedResponse>> {
    let url = req.url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::bad_request("url must be http(s)"));
    }

    let config = parse_config(
        req.lang,
        req.max_clips,
        req.clip_len,
        req.style_preset,
        req.aspect,
        req.emojis,
    )?;
    let job = Job::from_url(url, config);
    Ok(Json(submit(&state, job).await?))
}

/// POST /api/job/from_file (multipart)
pub async fn job_from_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<JobCreatedResponse>> {
    let job_id = JobId::new();
    let mut saved_path = None;
    let mut lang = None;
    let mut max_clips = None;
    let mut clip_len = None;
    let mut style_preset = None;
    let mut aspect = None;
    let mut emojis = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(sanitize_filename)
                    .unwrap_or_else(|| "upload.mp4".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("upload failed: {e}")))?;
                if bytes.is_empty() {
                    return Err(ApiError::bad_request("uploaded file is empty"));
                }

                let dest = state
                    .pipeline_config
                    .source_dir
                    .join(format!("{}_{}", job_id, filename));
                tokio::fs::create_dir_all(&state.pipeline_config.source_dir)
                    .await
                    .map_err(|e| ApiError::internal(e.to_string()))?;
                tokio::fs::write(&dest, &bytes)
                    .await
                    .map_err(|e| ApiError::internal(e.to_string()))?;
                saved_path = Some(dest);
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid field {other}: {e}")))?;
                match other {
                    "lang" => lang = Some(value),
                    "max_clips" => max_clips = value.parse().ok(),
                    "clip_len" => clip_len = value.parse().ok(),
                    "style_preset" => style_preset = Some(value),
                    "aspect" => aspect = Some(value),
                    "emojis" => emojis = value.parse().ok(),
                    _ => {}
                }
            }
        }
    }

    let path = saved_path.ok_or_else(|| ApiError::bad_request("missing file field"))?;
    let config = parse_config(lang, max_clips, clip_len, style_preset, aspect, emojis)?;

    // The upload was saved under the pre-generated ID, so the job keeps it.
    let mut job = Job::from_file(path, config);
    job.id = job_id;
    Ok(Json(submit(&state, job).await?))
}

/// GET /api/job/:job_id
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatus>> {
    let id = JobId::from_string(&job_id);

    if let Some(status) = state.registry.status(&id).await {
        return Ok(Json((*status).clone()));
    }
    // A restarted process loses the registry; the disk mirror still knows
    // finished jobs.
    if let Some(status) = state.status_store.load(&id).await {
        return Ok(Json(status));
    }
    Err(ApiError::not_found("Job not found"))
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
