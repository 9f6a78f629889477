//! Audio track extraction.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::traits::AudioExtractor;

/// Extracts a mono 16 kHz PCM WAV track with ffmpeg. 16 kHz mono is what
/// whisper-cli expects and keeps feature analysis cheap.
#[derive(Debug, Default)]
pub struct FfmpegAudioExtractor;

impl FfmpegAudioExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract(&self, video: &Path, dest: &Path) -> MediaResult<()> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }

        if dest.exists() {
            debug!("Using existing audio file: {}", dest.display());
            return Ok(());
        }

        info!(
            video = %video.display(),
            audio = %dest.display(),
            "Extracting audio track"
        );

        FfmpegCommand::new(video, dest)
            .no_video()
            .output_args(["-ac", "1", "-ar", "16000", "-acodec", "pcm_s16le"])
            .run()
            .await
    }
}
