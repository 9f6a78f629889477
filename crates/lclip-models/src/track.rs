//! Subject track model for auto-reframing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One sample of the crop-window track for a candidate, persisted to
/// `tracks/<seg_id>.json`.
///
/// Coordinates are relative (0.0-1.0) to the source frame; `zoom` is the
/// crop window size relative to frame height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrackFrame {
    /// Sample timestamp in seconds
    pub t: f64,

    /// Crop window center, horizontal
    pub center_x: f64,

    /// Crop window center, vertical
    pub center_y: f64,

    /// Crop window size
    pub zoom: f64,
}

impl TrackFrame {
    /// Centered frame used when no subject was detected at `t`.
    pub fn centered(t: f64) -> Self {
        Self {
            t,
            center_x: 0.5,
            center_y: 0.5,
            zoom: 0.5,
        }
    }
}
