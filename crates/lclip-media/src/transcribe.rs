//! Transcription via whisper.cpp's `whisper-cli` binary.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info, warn};

use lclip_models::{Transcript, TranscriptSegment, Word};

use crate::error::{MediaError, MediaResult};
use crate::traits::Transcriber;

const DEFAULT_WHISPER_BIN: &str = "whisper-cli";

/// Runs `whisper-cli` with full-JSON output and parses segments, token-level
/// words and confidences from it.
#[derive(Debug)]
pub struct WhisperCliTranscriber {
    binary: String,
    model: Option<PathBuf>,
}

impl WhisperCliTranscriber {
    pub fn new(model: Option<PathBuf>) -> Self {
        Self {
            binary: DEFAULT_WHISPER_BIN.to_string(),
            model,
        }
    }

    fn build_args(&self, audio: &Path, output_prefix: &Path, lang: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            audio.display().to_string(),
            "-of".to_string(),
            output_prefix.display().to_string(),
            // Full JSON carries token timestamps and probabilities.
            "-ojf".to_string(),
        ];
        if let Some(model) = &self.model {
            args.push("-m".to_string());
            args.push(model.display().to_string());
        }
        if let Some(lang) = lang {
            args.push("-l".to_string());
            args.push(lang.to_string());
        }
        args
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio: &Path, lang: Option<&str>) -> MediaResult<Transcript> {
        if !audio.exists() {
            return Err(MediaError::FileNotFound(audio.to_path_buf()));
        }

        which::which(&self.binary).map_err(|_| MediaError::WhisperNotFound)?;

        let output_prefix = audio.with_extension("whisper");
        let args = self.build_args(audio, &output_prefix, lang);

        info!(audio = %audio.display(), lang = ?lang, "Running transcription");
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::transcription_failed(format!(
                "whisper-cli failed: {}",
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        let json_path = PathBuf::from(format!("{}.json", output_prefix.display()));
        if !json_path.exists() {
            return Err(MediaError::transcription_failed(format!(
                "whisper-cli produced no JSON at {}",
                json_path.display()
            )));
        }

        let raw: Value = serde_json::from_str(&tokio::fs::read_to_string(&json_path).await?)?;
        let transcript = parse_whisper_json(&raw, lang);

        debug!(
            segments = transcript.segments.len(),
            avg_confidence = transcript.avg_confidence,
            "Parsed transcription output"
        );
        Ok(transcript)
    }
}

/// Parse whisper.cpp full-JSON output into a [`Transcript`].
///
/// The schema has shifted between whisper.cpp releases, so every field is
/// read defensively and missing pieces degrade to empty values.
fn parse_whisper_json(raw: &Value, requested_lang: Option<&str>) -> Transcript {
    let language = raw
        .pointer("/result/language")
        .or_else(|| raw.get("language"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| requested_lang.map(str::to_owned))
        .unwrap_or_else(|| "auto".to_string());

    let raw_segments = raw
        .get("transcription")
        .or_else(|| raw.get("segments"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut segments = Vec::with_capacity(raw_segments.len());
    let mut duration = 0.0_f64;

    for seg in &raw_segments {
        let start = offset_seconds(seg, "from").unwrap_or(0.0);
        let end = offset_seconds(seg, "to").unwrap_or(start);
        let text = seg
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();

        let mut words = Vec::new();
        if let Some(tokens) = seg.get("tokens").and_then(Value::as_array) {
            for token in tokens {
                let word = token
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim()
                    .to_string();
                // Special tokens like [_BEG_] carry no spoken text.
                if word.is_empty() || word.starts_with('[') {
                    continue;
                }
                let w_start = offset_seconds(token, "from").unwrap_or(start);
                let w_end = offset_seconds(token, "to").unwrap_or(w_start);
                let confidence = token.get("p").and_then(Value::as_f64).unwrap_or(0.0);
                words.push(Word {
                    word,
                    start: w_start,
                    end: w_end,
                    confidence,
                });
            }
        }

        let confidence = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.confidence).sum::<f64>() / words.len() as f64
        };

        if end > duration {
            duration = end;
        }
        segments.push(TranscriptSegment {
            start,
            end,
            text,
            words,
            confidence,
        });
    }

    if segments.is_empty() {
        warn!("Transcription produced no segments");
    }

    let scored: Vec<f64> = segments
        .iter()
        .filter(|s| !s.words.is_empty())
        .map(|s| s.confidence)
        .collect();
    let avg_confidence = if scored.is_empty() {
        0.0
    } else {
        scored.iter().sum::<f64>() / scored.len() as f64
    };

    let word_list = segments
        .iter()
        .flat_map(|s| s.words.iter().map(|w| w.word.clone()))
        .collect();

    Transcript {
        segments,
        words: word_list,
        language,
        avg_confidence,
        duration,
    }
}

/// Read `offsets.from` / `offsets.to` (milliseconds) as seconds.
fn offset_seconds(value: &Value, key: &str) -> Option<f64> {
    value
        .pointer(&format!("/offsets/{key}"))
        .and_then(Value::as_f64)
        .map(|ms| ms / 1_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_json() {
        let raw = json!({
            "result": {"language": "en"},
            "transcription": [
                {
                    "offsets": {"from": 0, "to": 2_000},
                    "text": " Hello world",
                    "tokens": [
                        {"text": "[_BEG_]", "offsets": {"from": 0, "to": 0}, "p": 0.99},
                        {"text": " Hello", "offsets": {"from": 0, "to": 800}, "p": 0.9},
                        {"text": " world", "offsets": {"from": 800, "to": 2_000}, "p": 0.8}
                    ]
                }
            ]
        });

        let t = parse_whisper_json(&raw, None);
        assert_eq!(t.language, "en");
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.segments[0].text, "Hello world");
        assert_eq!(t.segments[0].words.len(), 2);
        assert_eq!(t.segments[0].words[0].word, "Hello");
        assert!((t.segments[0].words[1].end - 2.0).abs() < 1e-9);
        assert!((t.avg_confidence - 0.85).abs() < 1e-9);
        assert!((t.duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_degrades_on_missing_fields() {
        let raw = json!({"transcription": [{"text": "bare segment"}]});
        let t = parse_whisper_json(&raw, Some("ru"));
        assert_eq!(t.language, "ru");
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.segments[0].text, "bare segment");
        assert!(t.segments[0].words.is_empty());
        assert_eq!(t.avg_confidence, 0.0);
    }

    #[test]
    fn test_parse_empty_output() {
        let t = parse_whisper_json(&json!({}), None);
        assert!(t.segments.is_empty());
        assert_eq!(t.language, "auto");
        assert_eq!(t.duration, 0.0);
    }

    #[test]
    fn test_build_args() {
        let t = WhisperCliTranscriber::new(Some(PathBuf::from("/models/ggml-base.bin")));
        let args = t.build_args(Path::new("a.wav"), Path::new("a.whisper"), Some("en"));
        assert!(args.contains(&"-ojf".to_string()));
        assert!(args.contains(&"-m".to_string()));
        assert!(args.contains(&"-l".to_string()));
        assert_eq!(args[1], "a.wav");
    }
}
