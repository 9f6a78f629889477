//! Supervised worker pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::pipeline::Pipeline;
use crate::queue::WorkQueue;

/// Liveness signal shared with the health endpoint.
#[derive(Debug, Default)]
pub struct WorkerHealth {
    alive: AtomicUsize,
    panics: AtomicUsize,
}

impl WorkerHealth {
    pub fn alive(&self) -> usize {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn panics(&self) -> usize {
        self.panics.load(Ordering::SeqCst)
    }

    pub fn is_healthy(&self) -> bool {
        self.alive() > 0
    }
}

/// Fixed-size pool of worker tasks draining the queue. Each worker runs
/// one job to its terminal state before taking the next. A panicking job
/// is recorded and the worker restarted; the pool never silently shrinks.
pub struct WorkerPool {
    health: Arc<WorkerHealth>,
    supervisors: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(worker_count: usize, queue: WorkQueue, pipeline: Arc<Pipeline>) -> Self {
        let health = Arc::new(WorkerHealth::default());
        let mut supervisors = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let queue = queue.clone();
            let pipeline = Arc::clone(&pipeline);
            let health = Arc::clone(&health);

            supervisors.push(tokio::spawn(async move {
                health.alive.fetch_add(1, Ordering::SeqCst);
                info!(worker_id, "Worker started");

                loop {
                    let Some(job) = queue.next().await else {
                        break;
                    };

                    // Run the job in its own task so a panic is contained
                    // and observable instead of killing this loop.
                    let pipeline = Arc::clone(&pipeline);
                    let job_id = job.id.clone();
                    let handle =
                        tokio::spawn(async move { pipeline.run(&job).await });

                    if let Err(e) = handle.await {
                        health.panics.fetch_add(1, Ordering::SeqCst);
                        error!(worker_id, job_id = %job_id, error = %e, "Job task panicked");
                    }
                }

                health.alive.fetch_sub(1, Ordering::SeqCst);
                info!(worker_id, "Worker stopped; queue closed");
            }));
        }

        Self {
            health,
            supervisors,
        }
    }

    pub fn health(&self) -> Arc<WorkerHealth> {
        Arc::clone(&self.health)
    }

    /// Wait for all workers to drain and exit. Only returns after the
    /// queue's senders are dropped.
    pub async fn join(self) {
        for handle in self.supervisors {
            let _ = handle.await;
        }
    }
}
