//! Highlight candidate model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A scored, time-bounded window of the source video considered for the
/// final highlight set.
///
/// Wire format matches the cached `highlights.json`:
/// `{id, start, end, rms, flux, zcr, kw_count, rake_count, score}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Candidate {
    /// Stable identifier assigned by acceptance rank (`seg_1`, `seg_2`, ...).
    /// Empty until the candidate is accepted.
    #[serde(default)]
    pub id: String,

    /// Start timestamp in seconds
    pub start: f64,

    /// End timestamp in seconds
    pub end: f64,

    /// Mean audio energy over the window
    pub rms: f64,

    /// Mean spectral flux over the window
    pub flux: f64,

    /// Mean zero-crossing rate over the window
    pub zcr: f64,

    /// Keyword matches from extractor A inside the window
    pub kw_count: usize,

    /// Key-phrase matches from extractor B inside the window
    pub rake_count: usize,

    /// Unnormalized sum of the five signals above
    pub score: f64,
}

impl Candidate {
    /// Unscored candidate covering a scene interval.
    pub fn from_interval(start: f64, end: f64) -> Self {
        Self {
            id: String::new(),
            start,
            end,
            rms: 0.0,
            flux: 0.0,
            zcr: 0.0,
            kw_count: 0,
            rake_count: 0,
            score: 0.0,
        }
    }

    /// Window duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Length of the temporal intersection with another candidate, in
    /// seconds. Non-overlapping windows yield a negative value.
    pub fn overlap_with(&self, other: &Candidate) -> f64 {
        self.end.min(other.end) - self.start.max(other.start)
    }
}
