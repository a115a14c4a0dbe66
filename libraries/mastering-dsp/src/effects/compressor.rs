//! Feed-forward band compressor
//!
//! Reduces the level of a band when its RMS envelope rises above a
//! threshold. Used once per band by the multiband compressor.
use mastering_core::BandSettings;

/// Attack and release times for one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTiming {
    /// Attack time in milliseconds
    pub attack_ms: f64,
    /// Release time in milliseconds
    pub release_ms: f64,
}

impl BandTiming {
    /// Low band: 10 ms attack, 200 ms release
    pub const LOW: Self = Self::new(10.0, 200.0);
    /// Mid band: 5 ms attack, 150 ms release
    pub const MID: Self = Self::new(5.0, 150.0);
    /// High band: 1 ms attack, 50 ms release
    pub const HIGH: Self = Self::new(1.0, 50.0);

    pub const fn new(attack_ms: f64, release_ms: f64) -> Self {
        Self {
            attack_ms,
            release_ms,
        }
    }
}

/// Band compressor
///
/// Two stages:
/// 1. Level detection: RMS over a trailing window one attack time long,
///    linked across channels so the stereo image does not shift
/// 2. Gain smoothing: the target reduction `(1 - 1/ratio) * overshoot`
///    is followed with the attack coefficient while it rises and the
///    release coefficient while it falls
///
/// Gain state starts at zero on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCompressor {
    threshold_db: f64,
    ratio: f64,
    attack_coeff: f64,
    release_coeff: f64,
    window_frames: usize,
}

impl BandCompressor {
    /// Create a compressor for `sample_rate`
    pub fn new(settings: BandSettings, timing: BandTiming, sample_rate: u32) -> Self {
        let sr = f64::from(sample_rate.max(1));

        // coeff = exp(-1 / (time_ms * sample_rate / 1000)): 63.2% of the
        // way to the target after `time_ms`
        let coeff = |ms: f64| {
            let samples = ms * sr / 1000.0;
            if samples > 0.0 {
                (-1.0 / samples).exp()
            } else {
                0.0
            }
        };

        Self {
            threshold_db: settings.threshold_db,
            ratio: settings.ratio.max(1.0),
            attack_coeff: coeff(timing.attack_ms),
            release_coeff: coeff(timing.release_ms),
            window_frames: ((timing.attack_ms * sr / 1000.0) as usize).max(1),
        }
    }

    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Level detector window length in frames
    pub fn window_frames(&self) -> usize {
        self.window_frames
    }

    /// Static gain reduction (dB, positive) for a detector level
    #[inline]
    pub fn target_reduction_db(&self, level_db: f64) -> f64 {
        let over = level_db - self.threshold_db;
        if over > 0.0 {
            (1.0 - 1.0 / self.ratio) * over
        } else {
            0.0
        }
    }

    /// Compress an interleaved buffer in place
    pub fn apply(&self, samples: &mut [f32], channels: usize) {
        if channels == 0 || self.ratio == 1.0 {
            return;
        }

        // Energies of the input frames currently inside the detector window
        let mut window = vec![0.0_f64; self.window_frames];
        let mut energy = 0.0_f64;
        let mut reduction_db = 0.0_f64;

        for (index, frame) in samples.chunks_exact_mut(channels).enumerate() {
            let slot = index % self.window_frames;
            let current: f64 = frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
            energy += current - window[slot];
            window[slot] = current;
            // Running sums can drift a hair below zero
            energy = energy.max(0.0);

            let filled = (index + 1).min(self.window_frames);
            let mean_square = energy / (filled * channels) as f64;

            let target = if mean_square > 0.0 {
                self.target_reduction_db(10.0 * mean_square.log10())
            } else {
                0.0
            };

            let coeff = if target > reduction_db {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            reduction_db = coeff * reduction_db + (1.0 - coeff) * target;

            if reduction_db > 0.0 {
                let gain = 10.0_f64.powf(-reduction_db / 20.0);
                for sample in frame.iter_mut() {
                    *sample = (f64::from(*sample) * gain) as f32;
                }
            }
        }
    }
}
