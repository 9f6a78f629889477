//! Pipeline error taxonomy.

use thiserror::Error;

use lclip_media::MediaError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while running a job through the pipeline.
///
/// The variants separate caller mistakes from source acquisition problems,
/// processing failures and artifact persistence failures; the API layer
/// maps them to status codes on this boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request itself is unusable (bad URL, missing upload, bad config).
    #[error("Invalid input: {0}")]
    Input(String),

    /// Fetching the source media failed.
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    /// A processing step failed (transcription, analysis, rendering).
    #[error("Processing failed: {0}")]
    Processing(String),

    /// An artifact could not be read or written.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Unknown job: {0}")]
    JobNotFound(String),
}

impl PipelineError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::Acquisition(message.into())
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}

impl From<MediaError> for PipelineError {
    fn from(err: MediaError) -> Self {
        match &err {
            MediaError::DownloadFailed { .. } | MediaError::YtDlpNotFound => {
                Self::Acquisition(err.to_string())
            }
            MediaError::Io(_) | MediaError::FileNotFound(_) => Self::Persistence(err.to_string()),
            _ => Self::Processing(err.to_string()),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
