//! Static-gain loudness normalization
//!
//! Measures the whole programme once and scales every sample by
//! `10^((target - measured) / 20)`. No limiting happens here; the mastering
//! chain runs its limiter afterwards.

use crate::analyzer::measure_integrated;
use crate::error::{LoudnessError, Result};
use mastering_core::AudioBuffer;
use tracing::{debug, info, warn};

/// What a normalization pass did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationOutcome {
    /// Integrated loudness before the gain, `None` when undefined
    pub measured_lufs: Option<f64>,
    /// Gain applied to every sample, in dB (0 when skipped)
    pub applied_gain_db: f64,
}

impl NormalizationOutcome {
    /// Whether a gain was actually applied
    pub fn is_applied(&self) -> bool {
        self.measured_lufs.is_some()
    }
}

/// Loudness normalizer towards a fixed LUFS target
///
/// # Example
///
/// ```ignore
/// use mastering_loudness::{LoudnessNormalizer, EBU_R128_STREAMING_LUFS};
///
/// let outcome = LoudnessNormalizer::new(EBU_R128_STREAMING_LUFS).normalize(&mut buffer)?;
/// println!("applied {:+.2} dB", outcome.applied_gain_db);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessNormalizer {
    target_lufs: f64,
}

impl LoudnessNormalizer {
    /// Create a normalizer for `target_lufs`
    pub fn new(target_lufs: f64) -> Self {
        Self { target_lufs }
    }

    pub fn target_lufs(&self) -> f64 {
        self.target_lufs
    }

    /// Gain in dB that moves `measured_lufs` onto the target
    pub fn gain_for(&self, measured_lufs: f64) -> f64 {
        self.target_lufs - measured_lufs
    }

    /// Measure `buffer` and scale it in place onto the target
    ///
    /// When the loudness is undefined (silence, or shorter than one gating
    /// block) the buffer is left untouched and the outcome reports 0 dB.
    ///
    /// # Errors
    /// Returns an error for a non-finite target or a format the meter
    /// cannot handle.
    pub fn normalize(&self, buffer: &mut AudioBuffer) -> Result<NormalizationOutcome> {
        if !self.target_lufs.is_finite() {
            return Err(LoudnessError::InvalidTarget(self.target_lufs));
        }

        let Some(measured) = measure_integrated(buffer)? else {
            warn!(
                target_lufs = self.target_lufs,
                frames = buffer.frames(),
                "Integrated loudness undefined, skipping normalization"
            );
            return Ok(NormalizationOutcome {
                measured_lufs: None,
                applied_gain_db: 0.0,
            });
        };

        let gain_db = self.gain_for(measured);
        let gain = 10.0_f64.powf(gain_db / 20.0);
        debug!(measured_lufs = measured, gain_db, "Applying normalization gain");

        for sample in &mut buffer.samples {
            *sample = (f64::from(*sample) * gain) as f32;
        }

        info!(
            measured_lufs = measured,
            target_lufs = self.target_lufs,
            gain_db,
            "Normalized programme loudness"
        );

        Ok(NormalizationOutcome {
            measured_lufs: Some(measured),
            applied_gain_db: gain_db,
        })
    }
}
