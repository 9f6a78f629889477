//! Preview still extraction.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::traits::PreviewExtractor;

/// Grabs a single JPEG frame with ffmpeg.
#[derive(Debug, Default)]
pub struct FfmpegPreviewExtractor;

impl FfmpegPreviewExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PreviewExtractor for FfmpegPreviewExtractor {
    async fn extract_still(&self, video: &Path, at: f64, dest: &Path) -> MediaResult<()> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }

        debug!(video = %video.display(), at, dest = %dest.display(), "Extracting preview frame");

        FfmpegCommand::new(video, dest)
            .seek(at)
            .single_frame()
            .output_args(["-q:v", "2"])
            .run()
            .await
    }
}
