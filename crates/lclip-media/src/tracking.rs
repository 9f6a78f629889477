//! Crop-window tracks for portrait reframing.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use lclip_models::TrackFrame;

use crate::error::MediaResult;
use crate::traits::SubjectTracker;

/// Sampling interval for track frames, in seconds.
const SAMPLE_STEP: f64 = 0.5;

/// Horizontal clamp half-width for a 9:16 window over a 16:9 frame.
const CX_HALF_RANGE: f64 = 9.0 / 32.0;

/// Produces a centered crop track at fixed sample intervals, smoothed and
/// clamped so the window stays inside the frame. Stands in for a face
/// detector; downstream rendering consumes the same track shape either way.
#[derive(Debug, Default)]
pub struct CenterWeightedTracker;

impl CenterWeightedTracker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubjectTracker for CenterWeightedTracker {
    async fn track(&self, video: &Path, start: f64, end: f64) -> MediaResult<Vec<TrackFrame>> {
        let mut frames = Vec::new();
        let mut t = start;
        while t < end {
            frames.push(TrackFrame::centered(t));
            t += SAMPLE_STEP;
        }

        smooth_track(&mut frames);
        clamp_track(&mut frames);

        debug!(
            video = %video.display(),
            start,
            end,
            samples = frames.len(),
            "Built crop track"
        );
        Ok(frames)
    }
}

/// 3-tap moving average over each channel. Endpoints average with implicit
/// zeros, matching a same-length convolution.
pub fn smooth_track(frames: &mut [TrackFrame]) {
    fn convolve(values: &[f64]) -> Vec<f64> {
        let n = values.len();
        (0..n)
            .map(|i| {
                let prev = if i > 0 { values[i - 1] } else { 0.0 };
                let next = if i + 1 < n { values[i + 1] } else { 0.0 };
                (prev + values[i] + next) / 3.0
            })
            .collect()
    }

    let cx = convolve(&frames.iter().map(|f| f.center_x).collect::<Vec<_>>());
    let cy = convolve(&frames.iter().map(|f| f.center_y).collect::<Vec<_>>());
    let zoom = convolve(&frames.iter().map(|f| f.zoom).collect::<Vec<_>>());

    for (i, frame) in frames.iter_mut().enumerate() {
        frame.center_x = cx[i];
        frame.center_y = cy[i];
        frame.zoom = zoom[i];
    }
}

/// Keep the crop window inside the source frame.
pub fn clamp_track(frames: &mut [TrackFrame]) {
    for frame in frames {
        frame.center_x = frame.center_x.clamp(0.5 - CX_HALF_RANGE, 0.5 + CX_HALF_RANGE);
        frame.center_y = frame.center_y.clamp(0.25, 0.75);
        frame.zoom = frame.zoom.clamp(0.3, 0.8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_track_samples_half_second_grid() {
        let frames = CenterWeightedTracker::new()
            .track(&PathBuf::from("v.mp4"), 10.0, 12.0)
            .await
            .unwrap();
        assert_eq!(frames.len(), 4);
        assert!((frames[0].t - 10.0).abs() < 1e-9);
        assert!((frames[3].t - 11.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_track_values_stay_clamped() {
        let frames = CenterWeightedTracker::new()
            .track(&PathBuf::from("v.mp4"), 0.0, 30.0)
            .await
            .unwrap();
        for f in &frames {
            assert!(f.center_x >= 0.5 - CX_HALF_RANGE && f.center_x <= 0.5 + CX_HALF_RANGE);
            assert!((0.25..=0.75).contains(&f.center_y));
            assert!((0.3..=0.8).contains(&f.zoom));
        }
    }

    #[test]
    fn test_smoothing_averages_neighbors() {
        let mut frames = vec![
            TrackFrame { t: 0.0, center_x: 0.3, center_y: 0.5, zoom: 0.5 },
            TrackFrame { t: 0.5, center_x: 0.6, center_y: 0.5, zoom: 0.5 },
            TrackFrame { t: 1.0, center_x: 0.3, center_y: 0.5, zoom: 0.5 },
        ];
        smooth_track(&mut frames);
        assert!((frames[1].center_x - 0.4).abs() < 1e-9);
        // Endpoint averages with an implicit zero neighbor.
        assert!((frames[0].center_x - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_pulls_outliers_inside() {
        let mut frames = vec![TrackFrame { t: 0.0, center_x: 0.95, center_y: 0.05, zoom: 1.2 }];
        clamp_track(&mut frames);
        assert!((frames[0].center_x - (0.5 + CX_HALF_RANGE)).abs() < 1e-9);
        assert!((frames[0].center_y - 0.25).abs() < 1e-9);
        assert!((frames[0].zoom - 0.8).abs() < 1e-9);
    }
}
