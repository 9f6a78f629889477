//! Final clip rendering.
//!
//! Cuts a candidate window out of the source video, crops to portrait,
//! scales, burns in ASS captions when present and normalizes audio.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use lclip_models::Candidate;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Output container/codec pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Mp4,
    Webm,
}

impl RenderFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    fn video_codec(&self) -> &'static str {
        match self {
            Self::Mp4 => "libx264",
            Self::Webm => "libvpx-vp9",
        }
    }

    fn audio_codec(&self) -> &'static str {
        match self {
            Self::Mp4 => "aac",
            Self::Webm => "libopus",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for RenderFormat {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            other => Err(MediaError::ffmpeg_failed(
                format!("unsupported render format: {other}"),
                None,
            )),
        }
    }
}

/// Render request for one job's selected candidates.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Target width of the portrait output (720 or 1080)
    pub resolution: u32,
    pub format: RenderFormat,
    /// Burn captions in when the candidate has an ASS file
    pub captions: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            resolution: 720,
            format: RenderFormat::Mp4,
            captions: true,
        }
    }
}

impl RenderOptions {
    fn scale_filter(&self) -> &'static str {
        if self.resolution == 1080 {
            "scale=1080:1920"
        } else {
            "scale=720:1280"
        }
    }
}

/// Render each candidate to `<outputs_dir>/<job_id>_<seg_id>.<fmt>`.
/// Returns the output paths in candidate order.
pub async fn render_segments(
    job_id: &str,
    source: &Path,
    job_dir: &Path,
    outputs_dir: &Path,
    candidates: &[Candidate],
    options: &RenderOptions,
) -> MediaResult<Vec<PathBuf>> {
    if !source.exists() {
        return Err(MediaError::FileNotFound(source.to_path_buf()));
    }
    tokio::fs::create_dir_all(outputs_dir).await?;

    let mut outputs = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let out_path = outputs_dir.join(format!(
            "{}_{}.{}",
            job_id,
            candidate.id,
            options.format.extension()
        ));

        let ass_path = job_dir.join(format!("{}.ass", candidate.id));
        let vf = build_video_filter(options, ass_path.exists().then_some(ass_path.as_path()));

        info!(
            job_id,
            seg_id = %candidate.id,
            start = candidate.start,
            end = candidate.end,
            output = %out_path.display(),
            "Rendering clip"
        );

        FfmpegCommand::new(source, &out_path)
            .seek(candidate.start)
            .until(candidate.end)
            .video_filter(vf)
            .audio_filter("loudnorm,aresample=48000")
            .video_codec(options.format.video_codec())
            .audio_codec(options.format.audio_codec())
            .video_bitrate("4M")
            .audio_bitrate("192k")
            .run()
            .await?;

        outputs.push(out_path);
    }
    Ok(outputs)
}

fn build_video_filter(options: &RenderOptions, ass_path: Option<&Path>) -> String {
    let mut filters = vec!["crop=ih*9/16:ih".to_string(), options.scale_filter().to_string()];
    if options.captions {
        if let Some(ass) = ass_path {
            filters.push(format!("ass={}", ass.display()));
        }
    }
    filters.join(",")
}
