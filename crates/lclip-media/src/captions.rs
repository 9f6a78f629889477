//! SRT and ASS caption generation for selected candidates.

use std::path::Path;

use tracing::debug;

use lclip_models::{Candidate, StylePreset, Transcript};

use crate::error::MediaResult;

/// Word-to-emoji substitutions applied when emoji injection is enabled.
/// Lookup is case-insensitive on the whole word.
const EMOJI_DICT: &[(&str, &str)] = &[
    ("1", "1\u{fe0f}\u{20e3}"),
    ("2", "2\u{fe0f}\u{20e3}"),
    ("3", "3\u{fe0f}\u{20e3}"),
    ("!", "\u{2757}"),
    ("?", "\u{2753}"),
    ("happy", "\u{1f603}"),
    ("sad", "\u{1f622}"),
    ("fire", "\u{1f525}"),
    ("star", "\u{2b50}"),
];

/// Write `<seg_id>.srt` and `<seg_id>.ass` for each candidate into
/// `job_dir`, using the words of the transcript that fall inside the
/// candidate's window.
pub async fn write_captions(
    job_dir: &Path,
    transcript: &Transcript,
    candidates: &[Candidate],
    preset: &StylePreset,
    emojis: bool,
) -> MediaResult<()> {
    for candidate in candidates {
        let words = transcript.words_within(candidate.start, candidate.end);
        let text = words
            .iter()
            .map(|w| inject_emoji(&w.word, emojis))
            .collect::<Vec<_>>()
            .join(" ");

        let srt = format!(
            "1\n{} --> {}\n{}\n\n",
            srt_time(candidate.start),
            srt_time(candidate.end),
            text
        );
        tokio::fs::write(job_dir.join(format!("{}.srt", candidate.id)), srt).await?;

        let ass = render_ass(&text, candidate.start, candidate.end, preset);
        tokio::fs::write(job_dir.join(format!("{}.ass", candidate.id)), ass).await?;

        debug!(seg_id = %candidate.id, words = words.len(), "Wrote captions");
    }
    Ok(())
}

fn inject_emoji(word: &str, enable: bool) -> String {
    if !enable {
        return word.to_string();
    }
    let lower = word.to_lowercase();
    EMOJI_DICT
        .iter()
        .find(|(k, _)| *k == lower)
        .map(|(_, v)| (*v).to_string())
        .unwrap_or_else(|| word.to_string())
}

/// SRT timestamp: `HH:MM:SS,mmm`.
fn srt_time(seconds: f64) -> String {
    let whole = seconds.floor() as u64;
    let h = whole / 3600;
    let m = (whole % 3600) / 60;
    let s = whole % 60;
    let ms = ((seconds - whole as f64) * 1_000.0) as u64;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// ASS timestamp: `H:MM:SS.cc`.
fn ass_time(seconds: f64) -> String {
    let whole = seconds.floor() as u64;
    let h = whole / 3600;
    let m = (whole % 3600) / 60;
    let s = whole % 60;
    let cs = ((seconds - whole as f64) * 100.0) as u64;
    format!("{h:01}:{m:02}:{s:02}.{cs:02}")
}

/// Minimal single-dialogue ASS document styled from the preset palette.
fn render_ass(text: &str, start: f64, end: f64, preset: &StylePreset) -> String {
    let shadow_depth = if preset.shadow.is_some() { 2 } else { 1 };
    format!(
        "[Script Info]\n\
         Title: Caption\n\
         ScriptType: v4.00+\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, OutlineColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,Arial,48,{primary},{outline},{shadow},0,0,1,3,{shadow_depth},2,10,10,10,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Text\n\
         Dialogue: 0,{start},{end},Default,{text}\n",
        primary = preset.primary_ass(),
        outline = preset.outline_ass(),
        shadow = preset.shadow_ass(),
        shadow_depth = shadow_depth,
        start = ass_time(start),
        end = ass_time(end),
        text = text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lclip_models::{TranscriptSegment, Word};

    fn word(word: &str, start: f64, end: f64) -> Word {
        Word {
            word: word.to_string(),
            start,
            end,
            confidence: 0.9,
        }
    }

    fn transcript() -> Transcript {
        Transcript {
            segments: vec![TranscriptSegment {
                start: 0.0,
                end: 40.0,
                text: "this is fire stuff".to_string(),
                words: vec![
                    word("this", 5.0, 5.5),
                    word("is", 5.5, 6.0),
                    word("fire", 6.0, 6.5),
                    word("stuff", 35.0, 36.0),
                ],
                confidence: 0.9,
            }],
            words: vec![],
            language: "en".to_string(),
            avg_confidence: 0.9,
            duration: 40.0,
        }
    }

    #[test]
    fn test_srt_time_format() {
        assert_eq!(srt_time(0.0), "00:00:00,000");
        assert_eq!(srt_time(3_725.5), "01:02:05,500");
    }

    #[test]
    fn test_ass_time_format() {
        assert_eq!(ass_time(0.0), "0:00:00.00");
        assert_eq!(ass_time(65.25), "0:01:05.25");
    }

    #[test]
    fn test_emoji_injection_toggle() {
        assert_eq!(inject_emoji("fire", true), "\u{1f525}");
        assert_eq!(inject_emoji("Fire", true), "\u{1f525}");
        assert_eq!(inject_emoji("fire", false), "fire");
        assert_eq!(inject_emoji("hello", true), "hello");
    }

    #[tokio::test]
    async fn test_write_captions_filters_to_window() {
        let dir = tempfile::tempdir().unwrap();
        let candidate = Candidate::from_interval(5.0, 30.0);
        let mut candidate = candidate;
        candidate.id = "seg_1".to_string();

        let preset = StylePreset::resolve(Some("mrbeast"));
        write_captions(dir.path(), &transcript(), &[candidate], &preset, true)
            .await
            .unwrap();

        let srt = std::fs::read_to_string(dir.path().join("seg_1.srt")).unwrap();
        assert!(srt.contains("00:00:05,000 --> 00:00:30,000"));
        assert!(srt.contains("this is \u{1f525}"));
        // "stuff" ends after the window and is excluded.
        assert!(!srt.contains("stuff"));

        let ass = std::fs::read_to_string(dir.path().join("seg_1.ass")).unwrap();
        assert!(ass.contains("&H00FFF000")); // mrbeast primary, BGR order
        assert!(ass.contains("Dialogue: 0,0:00:05.00,0:00:30.00,Default,"));
    }
}
