//! Four-band mastering equalizer
//!
//! Fixed chain: low shelf 250 Hz, bell 1 kHz, bell 4 kHz, high shelf 8 kHz.
//! Shelves are not analytic shelving biquads: the signal is blended with a
//! Butterworth-filtered copy of itself, which gives a soft transition.
//!
//! Bells use band edges `center / sqrt(Q)` and `center * sqrt(Q)`. At the
//! default `Q = 1.0` those edges coincide and the band-pass is nudged open
//! (see [`crate::filters::design_peak`]), so the bell is extremely narrow.
use super::chain::AudioStage;
use crate::error::Result;
use crate::filters::{design_peak, design_shelf, ShelfKind, SosFilter};
use mastering_core::MasteringSettings;
use tracing::debug;

/// Low shelf corner frequency
pub const LOW_SHELF_HZ: f64 = 250.0;
/// Mid bell centre
pub const MID_BELL_HZ: f64 = 1000.0;
/// Presence bell centre
pub const PRESENCE_BELL_HZ: f64 = 4000.0;
/// High shelf corner frequency
pub const HIGH_SHELF_HZ: f64 = 8000.0;

/// Butterworth order used for shelf blending
pub const SHELF_ORDER: usize = 5;
/// Default bell Q
pub const DEFAULT_Q: f64 = 1.0;

/// Shape of an EQ band
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandShape {
    /// Boost/cut below the corner (low-pass blend)
    LowShelf,
    /// Boost/cut above the corner (high-pass blend)
    HighShelf,
    /// Boost/cut around the centre (band-pass blend)
    Bell {
        /// Quality factor
        q: f64,
    },
}

/// One equalizer band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqBand {
    pub shape: BandShape,
    pub frequency_hz: f64,
    pub gain_db: f64,
}

impl EqBand {
    pub fn low_shelf(frequency_hz: f64, gain_db: f64) -> Self {
        Self {
            shape: BandShape::LowShelf,
            frequency_hz,
            gain_db,
        }
    }

    pub fn high_shelf(frequency_hz: f64, gain_db: f64) -> Self {
        Self {
            shape: BandShape::HighShelf,
            frequency_hz,
            gain_db,
        }
    }

    /// Bell with the default Q of 1.0
    pub fn bell(frequency_hz: f64, gain_db: f64) -> Self {
        Self::bell_with_q(frequency_hz, gain_db, DEFAULT_Q)
    }

    pub fn bell_with_q(frequency_hz: f64, gain_db: f64, q: f64) -> Self {
        Self {
            shape: BandShape::Bell { q },
            frequency_hz,
            gain_db,
        }
    }

    /// A 0 dB band is skipped entirely
    pub fn is_bypassed(&self) -> bool {
        self.gain_db == 0.0
    }

    /// Design the filter for `sample_rate`
    pub fn prepare(&self, sample_rate: u32) -> Result<PreparedBand> {
        let filter = match self.shape {
            BandShape::LowShelf => {
                design_shelf(sample_rate, self.frequency_hz, SHELF_ORDER, ShelfKind::Low)?
            }
            BandShape::HighShelf => {
                design_shelf(sample_rate, self.frequency_hz, SHELF_ORDER, ShelfKind::High)?
            }
            BandShape::Bell { q } => design_peak(sample_rate, self.frequency_hz, q)?,
        };
        Ok(PreparedBand {
            band: *self,
            filter,
            gain: 10.0_f64.powf(self.gain_db / 20.0),
        })
    }
}

/// A band with its filter designed for one sample rate
#[derive(Debug, Clone)]
pub struct PreparedBand {
    band: EqBand,
    filter: SosFilter,
    gain: f64,
}

impl PreparedBand {
    /// The band this was prepared from
    pub fn band(&self) -> &EqBand {
        &self.band
    }

    /// Process one channel in place
    pub fn apply(&self, channel: &mut [f32]) {
        let filtered = self.filter.apply(channel);
        let g = self.gain;

        let blend = |x: f64, f: f64| match self.band.shape {
            BandShape::LowShelf | BandShape::HighShelf if self.band.gain_db <= 0.0 => {
                x * g + f * (1.0 - g)
            }
            _ => x + f * (g - 1.0),
        };

        for (x, f) in channel.iter_mut().zip(filtered) {
            *x = blend(f64::from(*x), f64::from(f)) as f32;
        }
    }
}

/// Mastering equalizer stage
///
/// Channels are filtered independently with fresh filter state on every
/// call.
#[derive(Debug, Clone)]
pub struct Equalizer {
    bands: Vec<PreparedBand>,
}

impl Equalizer {
    /// Build from explicit bands; 0 dB bands are dropped
    pub fn new(bands: &[EqBand], sample_rate: u32) -> Result<Self> {
        let bands = bands
            .iter()
            .filter(|b| !b.is_bypassed())
            .map(|b| b.prepare(sample_rate))
            .collect::<Result<Vec<_>>>()?;
        debug!(sample_rate, active = bands.len(), "Designed equalizer bands");
        Ok(Self { bands })
    }

    /// The fixed mastering chain for the given settings
    pub fn from_settings(settings: &MasteringSettings, sample_rate: u32) -> Result<Self> {
        Self::new(&mastering_bands(settings), sample_rate)
    }

    /// Bands that will actually run
    pub fn active_bands(&self) -> impl Iterator<Item = &EqBand> {
        self.bands.iter().map(PreparedBand::band)
    }

    /// Process an interleaved buffer in place
    pub fn apply(&self, samples: &mut [f32], channels: usize) {
        if self.bands.is_empty() || channels == 0 {
            return;
        }

        for ch in 0..channels {
            let mut data: Vec<f32> = samples.iter().skip(ch).step_by(channels).copied().collect();
            for band in &self.bands {
                band.apply(&mut data);
            }
            for (dst, src) in samples.iter_mut().skip(ch).step_by(channels).zip(data) {
                *dst = src;
            }
        }
    }
}

impl AudioStage for Equalizer {
    fn name(&self) -> &str {
        "Equalizer"
    }

    fn is_active(&self) -> bool {
        !self.bands.is_empty()
    }

    fn process(&self, samples: &mut [f32], channels: usize) -> Result<()> {
        self.apply(samples, channels);
        Ok(())
    }
}

/// The four fixed mastering bands for `settings`
///
/// `mid_cut_db` is a cut: a positive value becomes negative bell gain.
pub fn mastering_bands(settings: &MasteringSettings) -> [EqBand; 4] {
    [
        EqBand::low_shelf(LOW_SHELF_HZ, settings.bass_boost_db),
        EqBand::bell(MID_BELL_HZ, -settings.mid_cut_db),
        EqBand::bell(PRESENCE_BELL_HZ, settings.presence_boost_db),
        EqBand::high_shelf(HIGH_SHELF_HZ, settings.treble_boost_db),
    ]
}

/// Apply the mastering EQ to an interleaved buffer
pub fn apply_eq(
    samples: &mut [f32],
    channels: usize,
    sample_rate: u32,
    settings: &MasteringSettings,
) -> Result<()> {
    Equalizer::from_settings(settings, sample_rate)?.apply(samples, channels);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::tests::generate_sine;

    const SR: u32 = 44_100;

    fn rms(samples: &[f32]) -> f64 {
        let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum / samples.len() as f64).sqrt()
    }

    #[test]
    fn neutral_settings_are_bit_exact_bypass() {
        let input = generate_sine(440.0, SR, 0.1);
        let mut output = input.clone();
        apply_eq(&mut output, 2, SR, &MasteringSettings::default()).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn zero_gain_bands_are_dropped() {
        let settings = MasteringSettings {
            bass_boost_db: 3.0,
            treble_boost_db: 0.0,
            ..Default::default()
        };
        let eq = Equalizer::from_settings(&settings, SR).unwrap();
        let active: Vec<_> = eq.active_bands().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].shape, BandShape::LowShelf);
    }

    #[test]
    fn mid_cut_becomes_negative_bell() {
        let settings = MasteringSettings {
            mid_cut_db: 3.0,
            ..Default::default()
        };
        let bands = mastering_bands(&settings);
        assert_eq!(bands[1].gain_db, -3.0);
        assert_eq!(bands[1].frequency_hz, MID_BELL_HZ);
    }

    #[test]
    fn low_shelf_boost_raises_bass() {
        let band = EqBand::low_shelf(LOW_SHELF_HZ, 6.0).prepare(SR).unwrap();
        let mut low: Vec<f32> = generate_sine(40.0, SR, 0.5).into_iter().step_by(2).collect();
        let before = rms(&low[SR as usize / 4..]);
        band.apply(&mut low);
        let after = rms(&low[SR as usize / 4..]);

        // Filter phase keeps the blend slightly under the nominal gain
        let gain_db = 20.0 * (after / before).log10();
        assert!((gain_db - 6.0).abs() < 0.5, "gain was {gain_db} dB");
    }

    #[test]
    fn shelf_cut_scales_the_unfiltered_side() {
        // x*g + f*(1-g): the passband stays, everything else drops by g
        let band = EqBand::low_shelf(LOW_SHELF_HZ, -6.0).prepare(SR).unwrap();
        let g = 10.0_f64.powf(-6.0 / 20.0);

        let mut high: Vec<f32> = generate_sine(5000.0, SR, 0.2).into_iter().step_by(2).collect();
        let before = rms(&high[2000..]);
        band.apply(&mut high);
        let after = rms(&high[2000..]);
        assert!((after / before - g).abs() < 0.01);

        let mut low: Vec<f32> = generate_sine(40.0, SR, 0.5).into_iter().step_by(2).collect();
        let before = rms(&low[SR as usize / 4..]);
        band.apply(&mut low);
        let after = rms(&low[SR as usize / 4..]);
        assert!((after / before - 1.0).abs() < 0.05);
    }

    #[test]
    fn wide_bell_boosts_centre() {
        let band = EqBand::bell_with_q(1000.0, 6.0, 4.0).prepare(SR).unwrap();
        let mut tone: Vec<f32> = generate_sine(1000.0, SR, 0.3).into_iter().step_by(2).collect();
        let before = rms(&tone[4000..]);
        band.apply(&mut tone);
        let after = rms(&tone[4000..]);
        let gain_db = 20.0 * (after / before).log10();
        assert!((gain_db - 6.0).abs() < 0.5, "gain was {gain_db} dB");
    }

    #[test]
    fn channels_are_filtered_independently() {
        let eq = Equalizer::new(&[EqBand::high_shelf(HIGH_SHELF_HZ, 4.0)], SR).unwrap();
        let mono: Vec<f32> = generate_sine(9000.0, SR, 0.05).into_iter().step_by(2).collect();

        let mut stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, 0.0]).collect();
        eq.apply(&mut stereo, 2);

        let mut expected = mono.clone();
        eq.apply(&mut expected, 1);

        let left: Vec<f32> = stereo.iter().step_by(2).copied().collect();
        let right: Vec<f32> = stereo.iter().skip(1).step_by(2).copied().collect();
        assert_eq!(left, expected);
        assert!(right.iter().all(|&s| s == 0.0));
    }
}
