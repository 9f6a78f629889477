//! Scene boundary detection via the ffmpeg scene-change filter.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::command::probe_duration;
use crate::error::{MediaError, MediaResult};
use crate::traits::SceneDetector;

/// Default content-change threshold for the ffmpeg `scene` score.
const DEFAULT_SCENE_THRESHOLD: f64 = 0.3;

/// Detects scene cuts with `select='gt(scene,T)'` and turns the cut
/// timestamps into contiguous intervals covering the full duration.
#[derive(Debug)]
pub struct FfmpegSceneDetector {
    threshold: f64,
}

impl FfmpegSceneDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_SCENE_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for FfmpegSceneDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SceneDetector for FfmpegSceneDetector {
    async fn detect_scenes(&self, video: &Path) -> MediaResult<Vec<(f64, f64)>> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let duration = probe_duration(video).await?;

        let filter = format!("select='gt(scene,{})',showinfo", self.threshold);
        let output = Command::new("ffmpeg")
            .args(["-v", "info", "-i"])
            .arg(video)
            .args(["-vf", &filter, "-an", "-f", "null", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::ffmpeg_failed(
                stderr.lines().last().unwrap_or("scene detection failed"),
                output.status.code(),
            ));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let cuts = parse_showinfo_timestamps(&stderr);
        let scenes = cuts_to_intervals(&cuts, duration);

        info!(
            video = %video.display(),
            scenes = scenes.len(),
            duration_s = duration,
            "Detected scenes"
        );
        debug!(?scenes, "scene intervals");

        Ok(scenes)
    }
}

/// Pull `pts_time:` values out of showinfo log lines.
fn parse_showinfo_timestamps(stderr: &str) -> Vec<f64> {
    let mut out = Vec::new();
    for line in stderr.lines() {
        if !line.contains("showinfo") {
            continue;
        }
        if let Some(rest) = line.split("pts_time:").nth(1) {
            let token: String = rest
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if let Ok(t) = token.parse::<f64>() {
                out.push(t);
            }
        }
    }
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

/// Convert ordered cut timestamps into contiguous `(start, end)` intervals
/// over `[0, duration]`. Cuts at or past the duration are dropped.
fn cuts_to_intervals(cuts: &[f64], duration: f64) -> Vec<(f64, f64)> {
    let mut scenes = Vec::new();
    let mut prev = 0.0;
    for &cut in cuts {
        if cut <= prev || cut >= duration {
            continue;
        }
        scenes.push((prev, cut));
        prev = cut;
    }
    if prev < duration {
        scenes.push((prev, duration));
    }
    scenes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_showinfo_timestamps() {
        let stderr = "\
[Parsed_showinfo_1 @ 0x1] n:   0 pts:  25600 pts_time:33.4     duration:512\n\
[Parsed_showinfo_1 @ 0x1] n:   1 pts:  51200 pts_time:61.72    duration:512\n\
frame=  2 fps=0.0 q=-0.0\n";
        assert_eq!(parse_showinfo_timestamps(stderr), vec![33.4, 61.72]);
    }

    #[test]
    fn test_cuts_to_intervals_cover_duration() {
        let scenes = cuts_to_intervals(&[30.0, 62.5], 100.0);
        assert_eq!(scenes, vec![(0.0, 30.0), (30.0, 62.5), (62.5, 100.0)]);
    }

    #[test]
    fn test_no_cuts_yields_single_scene() {
        assert_eq!(cuts_to_intervals(&[], 45.0), vec![(0.0, 45.0)]);
    }

    #[test]
    fn test_cut_beyond_duration_dropped() {
        let scenes = cuts_to_intervals(&[30.0, 120.0], 100.0);
        assert_eq!(scenes, vec![(0.0, 30.0), (30.0, 100.0)]);
    }
}
