//! Pipeline step vocabulary and per-step records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed, ordered vocabulary of pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Download,
    AudioExtract,
    Transcript,
    Highlights,
    Reframing,
    Previews,
    Captions,
    Ready,
}

impl StepName {
    /// Canonical execution order. A job's step list is always a prefix of
    /// this sequence.
    pub const SEQUENCE: &'static [StepName] = &[
        StepName::Download,
        StepName::AudioExtract,
        StepName::Transcript,
        StepName::Highlights,
        StepName::Reframing,
        StepName::Previews,
        StepName::Captions,
        StepName::Ready,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Download => "download",
            StepName::AudioExtract => "audio_extract",
            StepName::Transcript => "transcript",
            StepName::Highlights => "highlights",
            StepName::Reframing => "reframing",
            StepName::Previews => "previews",
            StepName::Captions => "captions",
            StepName::Ready => "ready",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// The step has been entered
    Started,
    /// The step finished successfully
    Done,
}

/// One entry in a job's step list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepRecord {
    /// Step name
    pub step: StepName,

    /// Step state
    #[serde(rename = "status")]
    pub state: StepState,

    /// Progress percentage (only steps that report it, e.g. download)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,

    /// Detected language (transcript step)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Mean per-word transcription confidence (transcript step)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_confidence: Option<f64>,
}

impl StepRecord {
    /// New record in the `started` state.
    pub fn started(step: StepName) -> Self {
        Self {
            step,
            state: StepState::Started,
            progress: None,
            lang: None,
            avg_confidence: None,
        }
    }

    /// Set progress, clamped to 0-100.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = Some(progress.min(100));
    }
}
