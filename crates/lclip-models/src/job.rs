//! Job definitions for queue processing.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::step::{StepName, StepRecord, StepState};
use crate::style::AspectRatio;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the source video comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    /// Remote reference resolved by the downloader.
    Url(String),
    /// File already on disk (upload endpoint saved it beforehand).
    LocalFile(PathBuf),
}

impl JobSource {
    /// The string form used to derive the cached source path.
    pub fn as_cache_key(&self) -> String {
        match self {
            JobSource::Url(url) => url.clone(),
            JobSource::LocalFile(path) => path.to_string_lossy().into_owned(),
        }
    }
}

/// User-supplied processing options, shared by both submission forms.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobConfig {
    /// Language hint for transcription (None = auto-detect)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Maximum number of clips to select
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_clips: Option<usize>,

    /// Target clip length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_len: Option<u32>,

    /// Caption style preset name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<String>,

    /// Target aspect ratio
    #[serde(default)]
    pub aspect: AspectRatio,

    /// Whether to inject emojis into captions
    #[serde(default = "default_emojis")]
    pub emojis: bool,
}

fn default_emojis() -> bool {
    true
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            lang: None,
            max_clips: None,
            clip_len: None,
            style_preset: None,
            aspect: AspectRatio::default(),
            emojis: true,
        }
    }
}

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job is waiting in queue
    #[default]
    Queued,
    /// Job is being processed by a worker
    Processing,
    /// All steps completed
    Ready,
    /// A step failed; remaining steps were aborted
    Error,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Ready => "ready",
            JobState::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Ready | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-job status record: the unit persisted to `status.json` and served by
/// the status endpoint.
///
/// The steps list is append-only and always a prefix of
/// [`StepName::SEQUENCE`]. Each update produces a fresh snapshot that
/// replaces the registry entry wholesale, so concurrent readers never
/// observe a half-applied update.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobStatus {
    /// Lifecycle state
    pub status: JobState,

    /// Ordered step records (prefix of the canonical sequence)
    pub steps: Vec<StepRecord>,

    /// Terminal error message (set only when status == error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    /// Fresh record for a just-submitted job.
    pub fn queued() -> Self {
        Self {
            status: JobState::Queued,
            steps: Vec::new(),
            error: None,
        }
    }

    /// Snapshot with status switched to processing.
    pub fn processing(&self) -> Self {
        let mut next = self.clone();
        next.status = JobState::Processing;
        next
    }

    /// Snapshot with a new `started` record appended for `step`.
    pub fn with_step_started(&self, step: StepName) -> Self {
        let mut next = self.clone();
        next.steps.push(StepRecord::started(step));
        next
    }

    /// Snapshot with the last step record updated in place.
    pub fn with_last_step(&self, f: impl FnOnce(&mut StepRecord)) -> Self {
        let mut next = self.clone();
        if let Some(last) = next.steps.last_mut() {
            f(last);
        }
        next
    }

    /// Snapshot with the last step marked done.
    pub fn with_step_done(&self) -> Self {
        self.with_last_step(|rec| rec.state = StepState::Done)
    }

    /// Snapshot with the job failed.
    pub fn failed(&self, message: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.status = JobState::Error;
        next.error = Some(message.into());
        next
    }

    /// Snapshot with the job marked ready.
    pub fn ready(&self) -> Self {
        let mut next = self.clone();
        next.status = JobState::Ready;
        next
    }

    /// Whether `self`'s steps are a prefix of `other`'s (by step name).
    pub fn is_step_prefix_of(&self, other: &JobStatus) -> bool {
        self.steps.len() <= other.steps.len()
            && self
                .steps
                .iter()
                .zip(other.steps.iter())
                .all(|(a, b)| a.step == b.step)
    }
}

/// A submitted job: identity, source and configuration.
///
/// Mutable state lives in [`JobStatus`]; a `Job` itself never changes after
/// submission, which is what lets workers own status updates exclusively.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Source descriptor
    pub source: JobSource,

    /// Processing options
    pub config: JobConfig,

    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job from a remote URL.
    pub fn from_url(url: impl Into<String>, config: JobConfig) -> Self {
        Self {
            id: JobId::new(),
            source: JobSource::Url(url.into()),
            config,
            created_at: Utc::now(),
        }
    }

    /// Create a new job from a local file.
    pub fn from_file(path: impl Into<PathBuf>, config: JobConfig) -> Self {
        Self {
            id: JobId::new(),
            source: JobSource::LocalFile(path.into()),
            config,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = Job::from_url("https://youtube.com/watch?v=abc", JobConfig::default());
        assert!(matches!(job.source, JobSource::Url(_)));
        assert!(job.config.emojis);
    }

    #[test]
    fn test_status_snapshots_are_append_only() {
        let queued = JobStatus::queued();
        assert_eq!(queued.status, JobState::Queued);
        assert!(queued.steps.is_empty());

        let processing = queued.processing();
        let started = processing.with_step_started(StepName::Download);
        assert_eq!(started.steps.len(), 1);
        assert_eq!(started.steps[0].state, StepState::Started);

        let done = started.with_step_done();
        assert_eq!(done.steps[0].state, StepState::Done);

        assert!(processing.is_step_prefix_of(&started));
        assert!(started.is_step_prefix_of(&done));
        assert!(!done.is_step_prefix_of(&processing));
    }

    #[test]
    fn test_failed_snapshot_keeps_steps() {
        let status = JobStatus::queued()
            .processing()
            .with_step_started(StepName::Download);
        let failed = status.failed("yt-dlp exited with status 1");

        assert_eq!(failed.status, JobState::Error);
        assert_eq!(failed.error.as_deref(), Some("yt-dlp exited with status 1"));
        assert_eq!(failed.steps.len(), 1);
    }

    #[test]
    fn test_status_serialization_shape() {
        let status = JobStatus::queued();
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "queued");
        assert!(json["steps"].as_array().unwrap().is_empty());
        assert!(json.get("error").is_none());
    }
}
