//! In-process FIFO work queue.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use lclip_models::Job;

use crate::error::{PipelineError, PipelineResult};

/// Unbounded FIFO of submitted jobs. Multiple workers share the receiving
/// end; the mutex hands each job to exactly one worker.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    tx: mpsc::UnboundedSender<Job>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Enqueue a job for processing.
    pub fn enqueue(&self, job: Job) -> PipelineResult<()> {
        self.tx
            .send(job)
            .map_err(|_| PipelineError::processing("work queue is closed"))
    }

    /// Take the next job, waiting until one arrives. Returns `None` when
    /// the queue has been closed and drained.
    pub async fn next(&self) -> Option<Job> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
