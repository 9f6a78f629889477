//! Media collaborators for the clipping pipeline.
//!
//! Wraps the external tools (ffmpeg, ffprobe, yt-dlp, whisper-cli) behind
//! narrow async traits, and implements the pure-Rust pieces: WAV feature
//! analysis, keyword extraction, crop tracks and caption generation.

pub mod audio;
pub mod captions;
pub mod command;
pub mod download;
pub mod error;
pub mod features;
pub mod keywords;
pub mod preview;
pub mod render;
pub mod scene;
pub mod tracking;
pub mod traits;
pub mod transcribe;

pub use audio::FfmpegAudioExtractor;
pub use captions::write_captions;
pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, probe_duration, FfmpegCommand};
pub use download::YtDlpDownloader;
pub use error::{MediaError, MediaResult};
pub use features::{AudioFeatures, WavFeatureAnalyzer};
pub use keywords::{count_matches, FrequencyKeywordExtractor, RakePhraseExtractor};
pub use preview::FfmpegPreviewExtractor;
pub use render::{render_segments, RenderFormat, RenderOptions};
pub use scene::FfmpegSceneDetector;
pub use tracking::CenterWeightedTracker;
pub use traits::{
    AudioAnalyzer, AudioExtractor, Downloader, KeywordExtractor, PreviewExtractor, SceneDetector,
    SubjectTracker, Transcriber,
};
pub use transcribe::WhisperCliTranscriber;
