//! Best-effort status persistence.
//!
//! Every status snapshot is mirrored to `<work_dir>/<job_id>/status.json`
//! so a status survives the registry when the process restarts. A write
//! failure is logged and ignored; disk mirroring never fails a job.

use std::path::PathBuf;

use tracing::warn;

use lclip_models::{JobId, JobStatus};

#[derive(Debug, Clone)]
pub struct StatusStore {
    work_dir: PathBuf,
}

impl StatusStore {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    fn status_path(&self, id: &JobId) -> PathBuf {
        self.work_dir.join(id.as_str()).join("status.json")
    }

    /// Persist a status snapshot, best effort.
    pub async fn persist(&self, id: &JobId, status: &JobStatus) {
        let path = self.status_path(id);
        let result: std::io::Result<()> = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let json = serde_json::to_vec_pretty(status)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            tokio::fs::write(&path, json).await
        }
        .await;

        if let Err(e) = result {
            warn!(job_id = %id, path = %path.display(), error = %e, "Failed to persist status");
        }
    }

    /// Load a persisted status, if one exists and parses.
    pub async fn load(&self, id: &JobId) -> Option<JobStatus> {
        let bytes = tokio::fs::read(self.status_path(id)).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}
