//! Bundle of media collaborators used by the pipeline.

use std::sync::Arc;

use lclip_media::{
    AudioAnalyzer, AudioExtractor, CenterWeightedTracker, Downloader, FfmpegAudioExtractor,
    FfmpegPreviewExtractor, FfmpegSceneDetector, FrequencyKeywordExtractor, KeywordExtractor,
    PreviewExtractor, RakePhraseExtractor, SceneDetector, SubjectTracker, Transcriber,
    WavFeatureAnalyzer, WhisperCliTranscriber, YtDlpDownloader,
};

use crate::config::PipelineConfig;

/// Every external capability the pipeline touches, behind trait objects so
/// tests can swap in mocks job-wide.
#[derive(Clone)]
pub struct Collaborators {
    pub downloader: Arc<dyn Downloader>,
    pub audio_extractor: Arc<dyn AudioExtractor>,
    pub transcriber: Arc<dyn Transcriber>,
    pub scene_detector: Arc<dyn SceneDetector>,
    pub audio_analyzer: Arc<dyn AudioAnalyzer>,
    pub keyword_extractor: Arc<dyn KeywordExtractor>,
    pub phrase_extractor: Arc<dyn KeywordExtractor>,
    pub tracker: Arc<dyn SubjectTracker>,
    pub preview_extractor: Arc<dyn PreviewExtractor>,
}

impl Collaborators {
    /// Wire up the real tool-backed implementations.
    pub fn production(config: &PipelineConfig) -> Self {
        Self {
            downloader: Arc::new(YtDlpDownloader::new()),
            audio_extractor: Arc::new(FfmpegAudioExtractor::new()),
            transcriber: Arc::new(WhisperCliTranscriber::new(config.whisper_model.clone())),
            scene_detector: Arc::new(FfmpegSceneDetector::new()),
            audio_analyzer: Arc::new(WavFeatureAnalyzer::new()),
            keyword_extractor: Arc::new(FrequencyKeywordExtractor::new()),
            phrase_extractor: Arc::new(RakePhraseExtractor::new()),
            tracker: Arc::new(CenterWeightedTracker::new()),
            preview_extractor: Arc::new(FfmpegPreviewExtractor::new()),
        }
    }
}
