//! Job orchestration for the clipping backend.
//!
//! Submission inserts a [`lclip_models::Job`] into the [`JobRegistry`] and
//! the [`WorkQueue`]; a [`WorkerPool`] drains the queue and drives each job
//! through the [`Pipeline`] step sequence, with the highlight step handled
//! by [`HighlightSelector`].

pub mod cache;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod registry;
pub mod selector;
pub mod status_store;
pub mod worker;

pub use cache::{digest_file, digest_hex, ArtifactCache};
pub use collaborators::Collaborators;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::Pipeline;
pub use queue::WorkQueue;
pub use registry::JobRegistry;
pub use selector::{HighlightSelector, DEFAULT_MAX_CLIPS};
pub use status_store::StatusStore;
pub use worker::{WorkerHealth, WorkerPool};
