//! Soft-knee peak limiter
//!
//! The final safety stage. Samples at or below the threshold pass through
//! untouched; the overshoot above it is squashed with
//! `d / sqrt(1 + (d/knee)^2)`, which approaches but never reaches `knee`.
//! The output therefore stays strictly under `threshold + knee` and rises
//! monotonically with the input magnitude.
use super::chain::AudioStage;
use crate::error::Result;

/// Default limiter threshold (linear)
pub const DEFAULT_THRESHOLD: f64 = 0.98;

/// Default knee constant (linear)
pub const DEFAULT_KNEE: f64 = 0.02;

/// Soft limiter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftLimiter {
    threshold: f64,
    knee: f64,
}

impl SoftLimiter {
    /// Create a limiter with threshold 0.98 and knee 0.02
    pub fn new() -> Self {
        Self::with_params(DEFAULT_THRESHOLD, DEFAULT_KNEE)
    }

    /// Create a limiter with custom parameters
    ///
    /// Non-finite or non-positive values fall back to the defaults.
    pub fn with_params(threshold: f64, knee: f64) -> Self {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        Self {
            threshold: if valid(threshold) {
                threshold
            } else {
                DEFAULT_THRESHOLD
            },
            knee: if valid(knee) { knee } else { DEFAULT_KNEE },
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn knee(&self) -> f64 {
        self.knee
    }

    /// Largest magnitude the limiter can output
    pub fn ceiling(&self) -> f64 {
        self.threshold + self.knee
    }

    /// Limit one sample
    #[inline]
    pub fn limit_sample(&self, x: f32) -> f32 {
        if x.is_nan() {
            return 0.0;
        }
        let magnitude = f64::from(x.abs());
        if magnitude <= self.threshold {
            return x;
        }

        let limited = if magnitude.is_infinite() {
            self.ceiling()
        } else {
            let over = magnitude - self.threshold;
            let ratio = over / self.knee;
            self.threshold + over / (1.0 + ratio * ratio).sqrt()
        };
        (limited as f32).copysign(x)
    }

    /// Limit samples in place
    pub fn apply(&self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.limit_sample(*sample);
        }
    }
}

impl Default for SoftLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioStage for SoftLimiter {
    fn process(&self, samples: &mut [f32], _channels: usize) -> Result<()> {
        self.apply(samples);
        Ok(())
    }

    fn name(&self) -> &str {
        "Soft Limiter"
    }
}

/// Limit samples in place with the given threshold and the default knee
pub fn limit(samples: &mut [f32], threshold: f64) {
    SoftLimiter::with_params(threshold, DEFAULT_KNEE).apply(samples);
}
