//! Clip metadata generation through a local Ollama instance.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;

/// Titles, hooks and hashtags suggested for one clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipMeta {
    pub titles: Vec<String>,
    pub hooks: Vec<String>,
    pub hashtags: Vec<String>,
}

/// Thin client over the Ollama generate endpoint. Generation is strictly
/// best effort: any failure degrades to empty metadata, and results are
/// cached per segment under `meta/<seg_id>.json`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

impl OllamaClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            url: config.ollama_url.clone(),
            model: config.ollama_model.clone(),
        }
    }

    /// Generate (or return cached) metadata for a segment.
    pub async fn clip_meta(
        &self,
        job_dir: &Path,
        seg_id: &str,
        transcript_text: &str,
    ) -> ClipMeta {
        let meta_dir = job_dir.join("meta");
        let meta_path = meta_dir.join(format!("{seg_id}.json"));

        if let Ok(bytes) = tokio::fs::read(&meta_path).await {
            if let Ok(meta) = serde_json::from_slice(&bytes) {
                debug!(seg_id, "Returning cached clip meta");
                return meta;
            }
        }

        let meta = self.generate(transcript_text).await.unwrap_or_else(|e| {
            warn!(seg_id, error = %e, "Meta generation failed; returning empty");
            ClipMeta::default()
        });

        if let Err(e) = async {
            tokio::fs::create_dir_all(&meta_dir).await?;
            tokio::fs::write(&meta_path, serde_json::to_vec_pretty(&meta)?).await?;
            Ok::<_, anyhow::Error>(())
        }
        .await
        {
            warn!(seg_id, error = %e, "Failed to cache clip meta");
        }

        meta
    }

    async fn generate(&self, transcript_text: &str) -> anyhow::Result<ClipMeta> {
        let prompt = format!(
            "From the segment text below, generate:\n\
             - 5 short titles (<=70 characters)\n\
             - 3 hooks (one sentence each)\n\
             - 10 hashtags (without #)\n\
             Text:\n{transcript_text}"
        );

        let response = self
            .http
            .post(&self.url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt: &prompt,
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        let text = body
            .get("response")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(parse_response(text))
    }
}

/// Parse a model response that is either a JSON object or labeled lines
/// (`Title: ...`, `Hook: ...`, `Hashtag: ...`).
fn parse_response(text: &str) -> ClipMeta {
    if let Ok(meta) = serde_json::from_str::<ClipMeta>(text) {
        return meta;
    }

    let mut meta = ClipMeta::default();
    for line in text.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();
        let value = || line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string();
        if lower.starts_with("title") {
            meta.titles.push(value());
        } else if lower.starts_with("hook") {
            meta.hooks.push(value());
        } else if lower.starts_with("hashtag") {
            meta.hashtags.push(value().replace('#', ""));
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_response() {
        let meta = parse_response(r#"{"titles":["a"],"hooks":["b"],"hashtags":["c"]}"#);
        assert_eq!(meta.titles, vec!["a"]);
        assert_eq!(meta.hooks, vec!["b"]);
        assert_eq!(meta.hashtags, vec!["c"]);
    }

    #[test]
    fn test_parse_labeled_lines() {
        let meta = parse_response(
            "Title 1: Big reveal\nHook: You won't believe it\nHashtag: #shorts\nnoise line",
        );
        assert_eq!(meta.titles, vec!["Big reveal"]);
        assert_eq!(meta.hooks, vec!["You won't believe it"]);
        assert_eq!(meta.hashtags, vec!["shorts"]);
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert_eq!(parse_response("no structure at all"), ClipMeta::default());
    }
}
