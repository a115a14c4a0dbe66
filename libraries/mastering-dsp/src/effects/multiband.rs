//! Three-band compressor
//!
//! The signal is split at 250 Hz and 4 kHz. Low and high bands come from
//! order-4 Butterworth low/high-pass filters; the mid band is the residual
//! `x - low - high`, so the three bands always sum back to the input.
use super::chain::AudioStage;
use super::compressor::{BandCompressor, BandTiming};
use crate::error::Result;
use crate::filters::{design_highpass, design_lowpass, SosFilter};
use mastering_core::MasteringSettings;

/// Low/mid crossover frequency
pub const LOW_CROSSOVER_HZ: f64 = 250.0;
/// Mid/high crossover frequency
pub const HIGH_CROSSOVER_HZ: f64 = 4000.0;
/// Butterworth order of the crossover filters
pub const CROSSOVER_ORDER: usize = 4;

/// Crossover filters for one sample rate
#[derive(Debug, Clone)]
pub struct Crossover {
    lowpass: SosFilter,
    highpass: SosFilter,
}

impl Crossover {
    /// Design crossovers at `low_hz` and `high_hz`
    pub fn new(sample_rate: u32, low_hz: f64, high_hz: f64) -> Result<Self> {
        Ok(Self {
            lowpass: design_lowpass(sample_rate, low_hz, CROSSOVER_ORDER)?,
            highpass: design_highpass(sample_rate, high_hz, CROSSOVER_ORDER)?,
        })
    }

    /// Split an interleaved buffer into interleaved low/mid/high bands
    pub fn split(&self, samples: &[f32], channels: usize) -> Bands {
        let channels = channels.max(1);
        let mut bands = Bands {
            low: vec![0.0; samples.len()],
            mid: vec![0.0; samples.len()],
            high: vec![0.0; samples.len()],
        };

        for ch in 0..channels {
            let input: Vec<f32> = samples.iter().skip(ch).step_by(channels).copied().collect();
            let low = self.lowpass.apply(&input);
            let high = self.highpass.apply(&input);

            for (i, ((x, l), h)) in input.iter().zip(&low).zip(&high).enumerate() {
                let index = i * channels + ch;
                bands.low[index] = *l;
                bands.high[index] = *h;
                bands.mid[index] = x - l - h;
            }
        }
        bands
    }
}

/// Interleaved band signals produced by [`Crossover::split`]
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    pub low: Vec<f32>,
    pub mid: Vec<f32>,
    pub high: Vec<f32>,
}

impl Bands {
    /// Sum the bands into `out`
    pub fn sum_into(&self, out: &mut [f32]) {
        for (((dst, l), m), h) in out.iter_mut().zip(&self.low).zip(&self.mid).zip(&self.high) {
            *dst = l + m + h;
        }
    }
}

/// Multiband compressor stage
#[derive(Debug, Clone)]
pub struct MultibandCompressor {
    crossover: Crossover,
    low: BandCompressor,
    mid: BandCompressor,
    high: BandCompressor,
}

impl MultibandCompressor {
    /// Build from the band thresholds/ratios in `settings`
    pub fn from_settings(settings: &MasteringSettings, sample_rate: u32) -> Result<Self> {
        Ok(Self {
            crossover: Crossover::new(sample_rate, LOW_CROSSOVER_HZ, HIGH_CROSSOVER_HZ)?,
            low: BandCompressor::new(settings.low_band, BandTiming::LOW, sample_rate),
            mid: BandCompressor::new(settings.mid_band, BandTiming::MID, sample_rate),
            high: BandCompressor::new(settings.high_band, BandTiming::HIGH, sample_rate),
        })
    }

    /// Compress an interleaved buffer in place
    pub fn apply(&self, samples: &mut [f32], channels: usize) {
        let mut bands = self.crossover.split(samples, channels);
        self.low.apply(&mut bands.low, channels);
        self.mid.apply(&mut bands.mid, channels);
        self.high.apply(&mut bands.high, channels);
        bands.sum_into(samples);
    }
}

impl AudioStage for MultibandCompressor {
    fn process(&self, samples: &mut [f32], channels: usize) -> Result<()> {
        self.apply(samples, channels);
        Ok(())
    }

    fn name(&self) -> &str {
        "Multiband Compressor"
    }
}

/// Split into bands at the standard crossovers
pub fn split_bands(samples: &[f32], channels: usize, sample_rate: u32) -> Result<Bands> {
    Ok(Crossover::new(sample_rate, LOW_CROSSOVER_HZ, HIGH_CROSSOVER_HZ)?.split(samples, channels))
}

/// Apply the multiband compressor in place
pub fn apply_multiband(
    samples: &mut [f32],
    channels: usize,
    sample_rate: u32,
    settings: &MasteringSettings,
) -> Result<()> {
    MultibandCompressor::from_settings(settings, sample_rate)?.apply(samples, channels);
    Ok(())
}
