//! Tanh saturation
use super::chain::AudioStage;
use crate::error::Result;

/// Harmonic saturator
///
/// `mix = (percent/100)^2`, `out = (1-mix)·x + mix·tanh(x·(1+4·mix))`.
/// Sample-wise, no state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturator {
    mix: f64,
}

impl Saturator {
    /// Create a saturator from a 0-100 amount
    pub fn new(amount_percent: f64) -> Self {
        let amount = (amount_percent / 100.0).clamp(0.0, 1.0);
        Self {
            mix: amount * amount,
        }
    }

    /// Wet/dry mix derived from the amount
    pub fn mix(&self) -> f64 {
        self.mix
    }

    #[inline]
    fn saturate(&self, x: f32) -> f32 {
        let x = f64::from(x);
        let drive = 1.0 + 4.0 * self.mix;
        ((1.0 - self.mix) * x + self.mix * (x * drive).tanh()) as f32
    }

    /// Process samples in place
    pub fn apply(&self, samples: &mut [f32]) {
        if self.mix == 0.0 {
            return;
        }
        for sample in samples.iter_mut() {
            *sample = self.saturate(*sample);
        }
    }
}

impl AudioStage for Saturator {
    fn process(&self, samples: &mut [f32], _channels: usize) -> Result<()> {
        self.apply(samples);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.mix != 0.0
    }

    fn name(&self) -> &str {
        "Saturator"
    }
}

/// Apply saturation in place
pub fn apply_saturation(samples: &mut [f32], amount_percent: f64) {
    Saturator::new(amount_percent).apply(samples);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_is_identity() {
        let input = vec![0.9, -1.2, 0.0, 0.333];
        let mut output = input.clone();
        apply_saturation(&mut output, 0.0);
        assert_eq!(input, output);
    }

    #[test]
    fn full_amount_is_pure_tanh() {
        let mut buffer = vec![0.5_f32];
        apply_saturation(&mut buffer, 100.0);
        let expected = (0.5_f64 * 5.0).tanh() as f32;
        assert!((buffer[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn mix_is_quadratic_in_amount() {
        assert!((Saturator::new(50.0).mix() - 0.25).abs() < 1e-12);
        assert!((Saturator::new(10.0).mix() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn saturation_is_odd_and_compresses_peaks() {
        let mut buffer = vec![0.9, -0.9];
        apply_saturation(&mut buffer, 60.0);
        assert_eq!(buffer[0], -buffer[1]);
        // tanh(x * drive) > x here, so the blend pushes towards full scale
        assert!(buffer[0] > 0.9 && buffer[0] < 1.0);
    }
}
