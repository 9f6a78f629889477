//! Shared data models for the LocalClip pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, job configuration and per-step status records
//! - Highlight candidates and subject tracks
//! - Time-aligned transcripts
//! - Caption style presets and aspect ratios

pub mod candidate;
pub mod job;
pub mod step;
pub mod style;
pub mod track;
pub mod transcript;

// Re-export common types
pub use candidate::Candidate;
pub use job::{Job, JobConfig, JobId, JobSource, JobState, JobStatus};
pub use step::{StepName, StepRecord, StepState};
pub use style::{AspectRatio, StylePreset};
pub use track::TrackFrame;
pub use transcript::{Transcript, TranscriptSegment, Word};
