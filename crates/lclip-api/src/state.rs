//! Shared application state.

use std::sync::Arc;

use lclip_pipeline::{
    Collaborators, JobRegistry, Pipeline, PipelineConfig, StatusStore, WorkQueue, WorkerHealth,
    WorkerPool,
};

use crate::config::ApiConfig;
use crate::services::OllamaClient;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline_config: PipelineConfig,
    pub registry: Arc<JobRegistry>,
    pub queue: WorkQueue,
    pub pipeline: Arc<Pipeline>,
    pub status_store: StatusStore,
    pub worker_health: Arc<WorkerHealth>,
    pub ollama: OllamaClient,
}

impl AppState {
    /// Wire up registry, queue, pipeline and worker pool.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let pipeline_config = PipelineConfig::from_env();
        pipeline_config.ensure_dirs().await?;

        let registry = Arc::new(JobRegistry::new());
        let queue = WorkQueue::new();
        let collaborators = Collaborators::production(&pipeline_config);
        let pipeline = Arc::new(Pipeline::new(
            pipeline_config.clone(),
            Arc::clone(&registry),
            collaborators,
        ));

        let pool = WorkerPool::spawn(
            pipeline_config.worker_count,
            queue.clone(),
            Arc::clone(&pipeline),
        );
        let worker_health = pool.health();
        // The pool tasks run until the queue closes; dropping the handle
        // container is fine, supervision lives in the tasks themselves.
        drop(pool);

        let status_store = StatusStore::new(&pipeline_config.work_dir);
        let ollama = OllamaClient::new(&config);

        Ok(Self {
            config,
            pipeline_config,
            registry,
            queue,
            pipeline,
            status_store,
            worker_health,
            ollama,
        })
    }
}
