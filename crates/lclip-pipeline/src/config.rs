//! Pipeline configuration.

use std::path::PathBuf;

/// Runtime configuration for the worker pool and media directories.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of concurrent workers
    pub worker_count: usize,

    /// Directory for downloaded source videos
    pub source_dir: PathBuf,

    /// Directory for per-job working artifacts
    pub work_dir: PathBuf,

    /// Directory for rendered outputs
    pub outputs_dir: PathBuf,

    /// Maximum clips to select per job when the request does not say
    pub default_max_clips: usize,

    /// Path to the whisper model file, if pinned
    pub whisper_model: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            source_dir: PathBuf::from("media/source"),
            work_dir: PathBuf::from("media/work"),
            outputs_dir: PathBuf::from("media/outputs"),
            default_max_clips: 15,
            whisper_model: None,
        }
    }
}

impl PipelineConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            worker_count: std::env::var("WORKER_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.worker_count),
            source_dir: std::env::var("MEDIA_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            work_dir: std::env::var("MEDIA_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            outputs_dir: std::env::var("MEDIA_OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.outputs_dir),
            default_max_clips: std::env::var("MAX_CLIPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.default_max_clips),
            whisper_model: std::env::var("WHISPER_MODEL").ok().map(PathBuf::from),
        }
    }

    /// Working directory for one job's artifacts.
    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.work_dir.join(job_id)
    }

    /// Ensure the media directories exist.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.source_dir).await?;
        tokio::fs::create_dir_all(&self.work_dir).await?;
        tokio::fs::create_dir_all(&self.outputs_dir).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.worker_count, 2);
        assert_eq!(config.default_max_clips, 15);
        assert_eq!(config.job_dir("abc"), PathBuf::from("media/work/abc"));
    }
}
