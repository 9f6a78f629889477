//! Collaborator seams for the pipeline.
//!
//! Each heavy media operation sits behind a narrow trait so the pipeline can
//! be exercised in tests without ffmpeg, yt-dlp or whisper-cli installed.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc;

use lclip_models::{TrackFrame, Transcript};

use crate::error::MediaResult;
use crate::features::AudioFeatures;

/// Fetches a source video to a local path.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` to `dest`. Progress percentages (0-100) are sent on
    /// `progress` as they become known; the channel may be dropped by the
    /// receiver at any time.
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: mpsc::UnboundedSender<u8>,
    ) -> MediaResult<()>;
}

/// Extracts a mono 16 kHz WAV track from a video file.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract(&self, video: &Path, dest: &Path) -> MediaResult<()>;
}

/// Produces a word-level transcript from a WAV file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path, lang: Option<&str>) -> MediaResult<Transcript>;
}

/// Splits a video into scene intervals covering its full duration.
#[async_trait]
pub trait SceneDetector: Send + Sync {
    /// Returns `(start, end)` pairs in seconds, ordered and contiguous.
    async fn detect_scenes(&self, video: &Path) -> MediaResult<Vec<(f64, f64)>>;
}

/// Computes frame-level loudness/flux/zcr signals from a WAV file.
#[async_trait]
pub trait AudioAnalyzer: Send + Sync {
    async fn analyze(&self, audio: &Path) -> MediaResult<AudioFeatures>;
}

/// Extracts salient terms from transcript text.
///
/// Implementations are pure text processing; the trait stays synchronous.
pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Produces a crop-window track for a candidate window of a video.
#[async_trait]
pub trait SubjectTracker: Send + Sync {
    async fn track(&self, video: &Path, start: f64, end: f64) -> MediaResult<Vec<TrackFrame>>;
}

/// Extracts a single still frame for previews.
#[async_trait]
pub trait PreviewExtractor: Send + Sync {
    async fn extract_still(&self, video: &Path, at: f64, dest: &Path) -> MediaResult<()>;
}
