//! Time-aligned transcript models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single recognized word with timing and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Word {
    /// The word text (as produced by the recognizer)
    pub word: String,

    /// Start timestamp in seconds
    pub start: f64,

    /// End timestamp in seconds
    pub end: f64,

    /// Recognizer probability for this word
    pub confidence: f64,
}

/// A transcript segment: a run of words with a combined text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub words: Vec<Word>,

    /// Mean word confidence for the segment
    pub confidence: f64,
}

/// Full transcript of a source video, cached as `transcript_<hash>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,

    /// Flat list of word strings, in order
    pub words: Vec<String>,

    /// Detected (or hinted) language code
    pub language: String,

    /// Mean per-word confidence over the whole transcript
    pub avg_confidence: f64,

    /// Total speech duration in seconds
    pub duration: f64,
}

impl Transcript {
    /// Full transcript text, segments joined by a single space.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Iterate all words across segments in order.
    pub fn iter_words(&self) -> impl Iterator<Item = &Word> {
        self.segments.iter().flat_map(|s| s.words.iter())
    }

    /// Words whose span lies entirely inside `[start, end]`.
    pub fn words_within(&self, start: f64, end: f64) -> Vec<&Word> {
        self.iter_words()
            .filter(|w| w.start >= start && w.end <= end)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            word: text.to_string(),
            start,
            end,
            confidence: 0.9,
        }
    }

    fn transcript() -> Transcript {
        Transcript {
            segments: vec![
                TranscriptSegment {
                    start: 0.0,
                    end: 2.0,
                    text: "hello world".to_string(),
                    words: vec![word("hello", 0.0, 1.0), word("world", 1.0, 2.0)],
                    confidence: 0.9,
                },
                TranscriptSegment {
                    start: 5.0,
                    end: 6.0,
                    text: "again".to_string(),
                    words: vec![word("again", 5.0, 6.0)],
                    confidence: 0.9,
                },
            ],
            words: vec!["hello".into(), "world".into(), "again".into()],
            language: "en".to_string(),
            avg_confidence: 0.9,
            duration: 6.0,
        }
    }

    #[test]
    fn test_full_text() {
        assert_eq!(transcript().full_text(), "hello world again");
    }

    #[test]
    fn test_words_within() {
        let t = transcript();
        let inside = t.words_within(0.5, 6.0);
        assert_eq!(inside.len(), 2);
        assert_eq!(inside[0].word, "world");
        assert_eq!(inside[1].word, "again");
    }
}
