//! Highlight candidate selection.
//!
//! Turns scene intervals, audio features and text signals into a ranked,
//! temporally well-separated candidate set.

use lclip_media::{count_matches, AudioFeatures};
use lclip_models::{Candidate, Transcript};

/// Candidate duration band in seconds. Scenes outside it are discarded
/// entirely, never merged or trimmed.
const MIN_DURATION: f64 = 20.0;
const MAX_DURATION: f64 = 60.0;

/// Maximum tolerated temporal intersection between selected candidates.
const OVERLAP_THRESHOLD: f64 = 2.0;

/// Default selection cap when the job does not set one.
pub const DEFAULT_MAX_CLIPS: usize = 15;

#[derive(Debug, Clone)]
pub struct HighlightSelector {
    min_duration: f64,
    max_duration: f64,
    overlap_threshold: f64,
}

impl Default for HighlightSelector {
    fn default() -> Self {
        Self {
            min_duration: MIN_DURATION,
            max_duration: MAX_DURATION,
            overlap_threshold: OVERLAP_THRESHOLD,
        }
    }
}

impl HighlightSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score, rank and greedily select candidates from the detected scenes.
    ///
    /// `keywords` and `phrases` come from the two text extractors applied
    /// to the full transcript; each candidate counts the terms whose text
    /// appears in its own window.
    pub fn select(
        &self,
        scenes: &[(f64, f64)],
        features: &AudioFeatures,
        transcript: &Transcript,
        keywords: &[String],
        phrases: &[String],
        max_clips: usize,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = scenes
            .iter()
            .filter(|(start, end)| {
                let duration = end - start;
                (self.min_duration..=self.max_duration).contains(&duration)
            })
            .map(|&(start, end)| {
                let mut c = Candidate::from_interval(start, end);
                let window_text = transcript
                    .words_within(start, end)
                    .iter()
                    .map(|w| w.word.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");

                c.rms = features.mean_rms(start, end);
                c.flux = features.mean_flux(start, end);
                c.zcr = features.mean_zcr(start, end);
                c.kw_count = count_matches(keywords, &window_text);
                c.rake_count = count_matches(phrases, &window_text);
                // Plain unweighted sum across signals.
                c.score = c.rms + c.flux + c.zcr + c.kw_count as f64 + c.rake_count as f64;
                c
            })
            .collect();

        // Stable sort: equal scores keep scene order, earlier scene wins.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut selected: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            if selected.len() >= max_clips {
                break;
            }
            let overlaps = selected
                .iter()
                .any(|s| candidate.overlap_with(s) > self.overlap_threshold);
            if !overlaps {
                selected.push(candidate);
            }
        }

        for (i, candidate) in selected.iter_mut().enumerate() {
            candidate.id = format!("seg_{}", i + 1);
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_features() -> AudioFeatures {
        AudioFeatures {
            frames_per_sec: 50.0,
            rms: vec![0.0; 50 * 200],
            flux: vec![0.0; 50 * 200],
            zcr: vec![0.0; 50 * 200],
        }
    }

    fn features_weighted(windows: &[(f64, f64, f32)]) -> AudioFeatures {
        let mut rms = vec![0.0f32; 50 * 200];
        for &(start, end, value) in windows {
            let lo = (start * 50.0) as usize;
            let hi = (end * 50.0) as usize;
            for v in &mut rms[lo..hi] {
                *v = value;
            }
        }
        AudioFeatures {
            frames_per_sec: 50.0,
            rms,
            flux: vec![0.0; 50 * 200],
            zcr: vec![0.0; 50 * 200],
        }
    }

    fn empty_transcript() -> Transcript {
        Transcript {
            segments: vec![],
            words: vec![],
            language: "en".to_string(),
            avg_confidence: 0.0,
            duration: 200.0,
        }
    }

    #[test]
    fn test_nms_rejects_overlapping_runner_up() {
        // (0,30) scores highest, (25,50) overlaps it by 5s and is dropped,
        // (100,140) is disjoint and accepted second.
        let scenes = [(0.0, 30.0), (25.0, 50.0), (100.0, 140.0)];
        let features = features_weighted(&[
            (0.0, 30.0, 0.9),
            (25.0, 50.0, 0.6),
            (100.0, 140.0, 0.3),
        ]);

        let selected = HighlightSelector::new().select(
            &scenes,
            &features,
            &empty_transcript(),
            &[],
            &[],
            2,
        );

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, "seg_1");
        assert_eq!(selected[0].start, 0.0);
        assert_eq!(selected[1].id, "seg_2");
        assert_eq!(selected[1].start, 100.0);
    }

    #[test]
    fn test_short_and_long_scenes_discarded() {
        let scenes = [(0.0, 15.0), (20.0, 45.0), (50.0, 160.0)];
        let selected = HighlightSelector::new().select(
            &scenes,
            &flat_features(),
            &empty_transcript(),
            &[],
            &[],
            15,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].start, 20.0);
    }

    #[test]
    fn test_tie_break_prefers_earlier_scene() {
        let scenes = [(0.0, 30.0), (50.0, 80.0)];
        let selected = HighlightSelector::new().select(
            &scenes,
            &flat_features(),
            &empty_transcript(),
            &[],
            &[],
            15,
        );
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].start, 0.0);
        assert_eq!(selected[1].start, 50.0);
    }

    #[test]
    fn test_max_clips_caps_selection() {
        let scenes: Vec<(f64, f64)> = (0..6).map(|i| (i as f64 * 40.0, i as f64 * 40.0 + 30.0)).collect();
        let selected = HighlightSelector::new().select(
            &scenes,
            &flat_features(),
            &empty_transcript(),
            &[],
            &[],
            3,
        );
        assert_eq!(selected.len(), 3);
        assert_eq!(selected.last().unwrap().id, "seg_3");
    }

    #[test]
    fn test_keyword_counts_shift_ranking() {
        use lclip_models::{TranscriptSegment, Word};

        let word = |w: &str, t: f64| Word {
            word: w.to_string(),
            start: t,
            end: t + 0.4,
            confidence: 0.9,
        };
        let transcript = Transcript {
            segments: vec![TranscriptSegment {
                start: 50.0,
                end: 80.0,
                text: "rust is amazing".to_string(),
                words: vec![word("rust", 51.0), word("is", 52.0), word("amazing", 53.0)],
                confidence: 0.9,
            }],
            words: vec![],
            language: "en".to_string(),
            avg_confidence: 0.9,
            duration: 200.0,
        };

        let scenes = [(0.0, 30.0), (50.0, 80.0)];
        let selected = HighlightSelector::new().select(
            &scenes,
            &flat_features(),
            &transcript,
            &["rust".to_string()],
            &["amazing".to_string()],
            15,
        );

        // The later scene carries both text matches and outranks the first.
        assert_eq!(selected[0].start, 50.0);
        assert_eq!(selected[0].kw_count, 1);
        assert_eq!(selected[0].rake_count, 1);
        assert!((selected[0].score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_selection_invariants_hold() {
        let scenes: Vec<(f64, f64)> = (0..8).map(|i| (i as f64 * 25.0, i as f64 * 25.0 + 28.0)).collect();
        let selected = HighlightSelector::new().select(
            &scenes,
            &flat_features(),
            &empty_transcript(),
            &[],
            &[],
            15,
        );

        for c in &selected {
            assert!(c.duration() >= MIN_DURATION && c.duration() <= MAX_DURATION);
        }
        for (i, a) in selected.iter().enumerate() {
            for b in &selected[i + 1..] {
                assert!(a.overlap_with(b) <= OVERLAP_THRESHOLD);
            }
        }
    }
}
