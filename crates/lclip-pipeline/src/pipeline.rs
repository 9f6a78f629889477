//! Per-job step sequence.
//!
//! A worker runs one job at a time through the canonical step order,
//! persisting a status snapshot around every transition. A step failure
//! marks the job `error` and stops the sequence; it never unwinds the
//! worker itself.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use lclip_media::write_captions;
use lclip_models::{Candidate, Job, JobSource, JobStatus, StepName, StylePreset, Transcript};

use crate::cache::{digest_file, digest_hex, ArtifactCache};
use crate::collaborators::Collaborators;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::registry::JobRegistry;
use crate::selector::HighlightSelector;
use crate::status_store::StatusStore;

pub struct Pipeline {
    config: PipelineConfig,
    registry: Arc<JobRegistry>,
    status_store: StatusStore,
    collaborators: Collaborators,
    selector: HighlightSelector,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        registry: Arc<JobRegistry>,
        collaborators: Collaborators,
    ) -> Self {
        let status_store = StatusStore::new(&config.work_dir);
        Self {
            config,
            registry,
            status_store,
            collaborators,
            selector: HighlightSelector::new(),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one job to its terminal state. Errors are absorbed into the
    /// job's status; the caller's loop continues regardless.
    pub async fn run(&self, job: &Job) {
        info!(job_id = %job.id, "Starting job");

        if let Err(e) = self.run_steps(job).await {
            error!(job_id = %job.id, error = %e, "Job failed");
            self.mutate_status(job, |s| s.failed(e.to_string())).await;
        } else {
            info!(job_id = %job.id, "Job ready");
        }
    }

    async fn run_steps(&self, job: &Job) -> PipelineResult<()> {
        let job_dir = self.config.job_dir(job.id.as_str());
        tokio::fs::create_dir_all(&job_dir).await?;

        self.mutate_status(job, |s| s.processing()).await;

        // download
        self.step_started(job, StepName::Download).await;
        let source = self.acquire_source(job).await?;
        self.step_done(job).await;

        // audio_extract
        self.step_started(job, StepName::AudioExtract).await;
        let audio = source.with_extension("wav");
        self.collaborators
            .audio_extractor
            .extract(&source, &audio)
            .await?;
        self.step_done(job).await;

        // transcript
        self.step_started(job, StepName::Transcript).await;
        let transcript = self.transcribe_cached(job, &audio).await?;
        let lang = transcript.language.clone();
        let avg_confidence = transcript.avg_confidence;
        self.mutate_status(job, |s| {
            s.with_last_step(|rec| {
                rec.state = lclip_models::StepState::Done;
                rec.lang = Some(lang.clone());
                rec.avg_confidence = Some(avg_confidence);
            })
        })
        .await;

        // highlights
        self.step_started(job, StepName::Highlights).await;
        let candidates = self.select_highlights(job, &source, &transcript).await?;
        self.step_done(job).await;

        // reframing
        self.step_started(job, StepName::Reframing).await;
        let tracks_dir = job_dir.join("tracks");
        tokio::fs::create_dir_all(&tracks_dir).await?;
        for candidate in &candidates {
            let track = self
                .collaborators
                .tracker
                .track(&source, candidate.start, candidate.end)
                .await?;
            let path = tracks_dir.join(format!("{}.json", candidate.id));
            tokio::fs::write(&path, serde_json::to_vec_pretty(&track)?).await?;
        }
        self.step_done(job).await;

        // previews
        self.step_started(job, StepName::Previews).await;
        for candidate in &candidates {
            let mid = (candidate.start + candidate.end) / 2.0;
            let dest = job_dir.join(format!("{}_preview.jpg", candidate.id));
            self.collaborators
                .preview_extractor
                .extract_still(&source, mid, &dest)
                .await?;
        }
        self.step_done(job).await;

        // captions
        self.step_started(job, StepName::Captions).await;
        let preset = StylePreset::resolve(job.config.style_preset.as_deref());
        write_captions(&job_dir, &transcript, &candidates, &preset, job.config.emojis).await?;
        self.step_done(job).await;

        // ready
        self.step_started(job, StepName::Ready).await;
        self.mutate_status(job, |s| s.with_step_done().ready()).await;
        Ok(())
    }

    /// Resolve the source video onto disk. Remote sources land at a
    /// URL-addressed path so a repeated URL reuses the earlier download.
    async fn acquire_source(&self, job: &Job) -> PipelineResult<PathBuf> {
        match &job.source {
            JobSource::LocalFile(path) => {
                if !path.exists() {
                    return Err(PipelineError::input(format!(
                        "uploaded file missing: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
            JobSource::Url(url) => {
                let dest = self
                    .config
                    .source_dir
                    .join(format!("{}.mp4", digest_hex(url.as_bytes())));
                tokio::fs::create_dir_all(&self.config.source_dir).await?;

                let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
                let registry = Arc::clone(&self.registry);
                let status_store = self.status_store.clone();
                let job_id = job.id.clone();
                let drain = tokio::spawn(async move {
                    while let Some(pct) = rx.recv().await {
                        if let Some(current) = registry.status(&job_id).await {
                            let next = current.with_last_step(|rec| rec.set_progress(pct));
                            let snapshot = registry.update_status(&job_id, next).await;
                            status_store.persist(&job_id, &snapshot).await;
                        }
                    }
                });

                let result = self.collaborators.downloader.fetch(url, &dest, tx).await;
                // The sender is dropped by fetch; wait for the last
                // progress update to land before the next step record.
                let _ = drain.await;
                result?;
                Ok(dest)
            }
        }
    }

    /// Transcribe the audio track. The cache key is a digest of the audio
    /// bytes and lives in the job's directory, so a reprocessed job skips
    /// the work while jobs never write outside their own area.
    async fn transcribe_cached(
        &self,
        job: &Job,
        audio: &std::path::Path,
    ) -> PipelineResult<Transcript> {
        let hash = digest_file(audio).await?;
        let job_dir = self.config.job_dir(job.id.as_str());
        let cache = ArtifactCache::new(&job_dir);
        let name = format!("transcript_{hash}.json");

        let transcriber = Arc::clone(&self.collaborators.transcriber);
        let lang = job.config.lang.clone();
        let transcript: Transcript = cache
            .get_or_compute(&name, || async move {
                let t = transcriber.transcribe(audio, lang.as_deref()).await?;
                Ok(t)
            })
            .await?;

        // Companion SRT for the whole transcript, best effort.
        let srt_path = job_dir.join(format!("transcript_{hash}.srt"));
        if !srt_path.exists() {
            if let Err(e) = tokio::fs::write(&srt_path, transcript_srt(&transcript)).await {
                warn!(path = %srt_path.display(), error = %e, "Failed to write transcript SRT");
            }
        }

        Ok(transcript)
    }

    /// Run the selector, or return the job's cached highlight list as-is.
    pub async fn select_highlights(
        &self,
        job: &Job,
        source: &std::path::Path,
        transcript: &Transcript,
    ) -> PipelineResult<Vec<Candidate>> {
        let cache = ArtifactCache::new(self.config.job_dir(job.id.as_str()));
        let max_clips = job.config.max_clips.unwrap_or(self.config.default_max_clips.max(1));

        let collaborators = self.collaborators.clone();
        let selector = self.selector.clone();
        let audio = source.with_extension("wav");
        let source = source.to_path_buf();

        cache
            .get_or_compute("highlights.json", || async move {
                let scenes = collaborators.scene_detector.detect_scenes(&source).await?;
                let features = collaborators.audio_analyzer.analyze(&audio).await?;

                // Text extraction is CPU-bound on long transcripts.
                let full_text = transcript.full_text();
                let kw = Arc::clone(&collaborators.keyword_extractor);
                let ph = Arc::clone(&collaborators.phrase_extractor);
                let (keywords, phrases) = tokio::task::spawn_blocking(move || {
                    (kw.extract(&full_text), ph.extract(&full_text))
                })
                .await
                .map_err(|e| {
                    PipelineError::processing(format!("keyword extraction task failed: {e}"))
                })?;

                Ok(selector.select(
                    &scenes,
                    &features,
                    transcript,
                    &keywords,
                    &phrases,
                    max_clips,
                ))
            })
            .await
    }

    async fn step_started(&self, job: &Job, step: StepName) {
        self.mutate_status(job, |s| s.with_step_started(step)).await;
    }

    async fn step_done(&self, job: &Job) {
        self.mutate_status(job, |s| s.with_step_done()).await;
    }

    async fn mutate_status(&self, job: &Job, f: impl FnOnce(&JobStatus) -> JobStatus) {
        let current = self
            .registry
            .status(&job.id)
            .await
            .unwrap_or_else(|| Arc::new(JobStatus::queued()));
        let next = f(&current);
        let snapshot = self.registry.update_status(&job.id, next).await;
        self.status_store.persist(&job.id, &snapshot).await;
    }
}

/// Format a whole transcript as a numbered SRT document.
fn transcript_srt(transcript: &Transcript) -> String {
    fn time(seconds: f64) -> String {
        let whole = seconds.floor() as u64;
        let ms = ((seconds - whole as f64) * 1_000.0) as u64;
        format!(
            "{:02}:{:02}:{:02},{:03}",
            whole / 3600,
            (whole % 3600) / 60,
            whole % 60,
            ms
        )
    }

    let mut out = String::new();
    for (i, seg) in transcript.segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            time(seg.start),
            time(seg.end),
            seg.text
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lclip_models::TranscriptSegment;

    #[test]
    fn test_transcript_srt_format() {
        let transcript = Transcript {
            segments: vec![
                TranscriptSegment {
                    start: 0.0,
                    end: 2.5,
                    text: "hello".to_string(),
                    words: vec![],
                    confidence: 0.9,
                },
                TranscriptSegment {
                    start: 2.5,
                    end: 5.0,
                    text: "world".to_string(),
                    words: vec![],
                    confidence: 0.9,
                },
            ],
            words: vec![],
            language: "en".to_string(),
            avg_confidence: 0.9,
            duration: 5.0,
        };

        let srt = transcript_srt(&transcript);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,500\nhello\n\n"));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000\nworld\n\n"));
    }
}
