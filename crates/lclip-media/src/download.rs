//! Video download using yt-dlp.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::traits::Downloader;

/// Downloads videos with the `yt-dlp` binary, reporting percentage progress
/// parsed from its `--newline` output.
#[derive(Debug, Default)]
pub struct YtDlpDownloader;

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: mpsc::UnboundedSender<u8>,
    ) -> MediaResult<()> {
        // A previously downloaded source is reused as-is.
        if dest.exists() {
            info!("Using existing video file: {}", dest.display());
            let _ = progress.send(100);
            return Ok(());
        }

        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        info!("Downloading video from {} to {}", url, dest.display());

        let dest_str = dest.to_string_lossy().to_string();
        let mut child = Command::new("yt-dlp")
            .args([
                "--newline",
                "-f",
                "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
                "-o",
                &dest_str,
                url,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain stderr alongside stdout; a chatty child fills the stderr
        // pipe and stalls both streams otherwise.
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut last = String::new();
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if !line.trim().is_empty() {
                        last = line;
                    }
                }
            }
            last
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(pct) = parse_progress_line(&line) {
                    let _ = progress.send(pct);
                }
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();
        if !status.success() {
            debug!("yt-dlp stderr: {}", stderr);
            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                if stderr.is_empty() {
                    "unknown error"
                } else {
                    &stderr
                }
            )));
        }

        if !dest.exists() {
            return Err(MediaError::download_failed("Output file not created"));
        }

        let file_size = dest.metadata()?.len();
        if file_size == 0 {
            warn!("Downloaded file {} is empty", dest.display());
            return Err(MediaError::download_failed("Output file is empty"));
        }

        info!(
            output = %dest.display(),
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );
        let _ = progress.send(100);

        Ok(())
    }
}

/// Parse a percentage from a yt-dlp `--newline` progress line, e.g.
/// `[download]  42.3% of 120.00MiB at 2.50MiB/s ETA 00:30`.
fn parse_progress_line(line: &str) -> Option<u8> {
    let rest = line.strip_prefix("[download]")?.trim_start();
    let pct_str = rest.split('%').next()?.trim();
    let pct: f64 = pct_str.parse().ok()?;
    Some(pct.clamp(0.0, 100.0) as u8)
}
