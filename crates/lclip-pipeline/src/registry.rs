//! In-memory job registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use lclip_models::{Job, JobId, JobStatus};

/// Shared map of every job submitted this process, with its latest status
/// snapshot.
///
/// Statuses are immutable [`Arc`] snapshots replaced wholesale on update;
/// readers holding a snapshot keep a consistent view while workers move on.
#[derive(Debug, Default)]
pub struct JobRegistry {
    inner: RwLock<HashMap<JobId, Entry>>,
}

#[derive(Debug)]
struct Entry {
    job: Arc<Job>,
    status: Arc<JobStatus>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly submitted job as queued.
    pub async fn insert(&self, job: Job) {
        let mut inner = self.inner.write().await;
        inner.insert(
            job.id.clone(),
            Entry {
                job: Arc::new(job),
                status: Arc::new(JobStatus::queued()),
            },
        );
    }

    /// Replace a job's status snapshot.
    pub async fn update_status(&self, id: &JobId, status: JobStatus) -> Arc<JobStatus> {
        let snapshot = Arc::new(status);
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.get_mut(id) {
            entry.status = Arc::clone(&snapshot);
        }
        snapshot
    }

    /// Latest status snapshot for a job.
    pub async fn status(&self, id: &JobId) -> Option<Arc<JobStatus>> {
        let inner = self.inner.read().await;
        inner.get(id).map(|e| Arc::clone(&e.status))
    }

    /// The immutable job record.
    pub async fn job(&self, id: &JobId) -> Option<Arc<Job>> {
        let inner = self.inner.read().await;
        inner.get(id).map(|e| Arc::clone(&e.job))
    }

    /// All known job IDs.
    pub async fn job_ids(&self) -> Vec<JobId> {
        let inner = self.inner.read().await;
        inner.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
