//! Mid/side stereo width
use super::chain::AudioStage;
use crate::error::Result;

/// Stereo imager
///
/// `mid = (L+R)/2`, `side = (L-R)/2 * width`, `L' = mid+side`, `R' = mid-side`.
/// No clipping protection; the final limiter handles overs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoImager {
    width: f32,
}

impl StereoImager {
    /// Create an imager (0.0 = mono, 1.0 = unchanged)
    pub fn new(width: f64) -> Self {
        Self {
            width: width as f32,
        }
    }

    /// Current width
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Process an interleaved buffer in place; only stereo is touched
    pub fn apply(&self, samples: &mut [f32], channels: usize) {
        if channels != 2 || self.width == 1.0 {
            return;
        }

        for frame in samples.chunks_exact_mut(2) {
            let mid = (frame[0] + frame[1]) * 0.5;
            let side = (frame[0] - frame[1]) * 0.5 * self.width;
            frame[0] = mid + side;
            frame[1] = mid - side;
        }
    }
}

impl AudioStage for StereoImager {
    fn process(&self, samples: &mut [f32], channels: usize) -> Result<()> {
        self.apply(samples, channels);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.width != 1.0
    }

    fn name(&self) -> &str {
        "Stereo Imager"
    }
}

/// Apply stereo width to an interleaved buffer
pub fn apply_width(samples: &mut [f32], channels: usize, width: f64) {
    StereoImager::new(width).apply(samples, channels);
}
