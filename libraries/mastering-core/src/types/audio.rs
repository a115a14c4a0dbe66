//! Audio-related types
use crate::error::{MasteringError, Result};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Common sample rates
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);
    pub const HIGH_RES_96: Self = Self(96_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Bit depth of the decoded source, used to re-quantize on export
    pub bits_per_sample: u16,

    /// Source samples were IEEE float rather than integer PCM
    #[serde(default)]
    pub is_float: bool,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
            is_float: false,
        }
    }

    /// 32-bit float format
    pub fn float(sample_rate: SampleRate, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: 32,
            is_float: true,
        }
    }

    /// Create CD quality stereo format (44.1kHz, 16-bit, stereo)
    pub fn cd_quality() -> Self {
        Self {
            sample_rate: SampleRate::CD_QUALITY,
            channels: 2,
            bits_per_sample: 16,
            is_float: false,
        }
    }
}

/// Audio buffer containing decoded samples
///
/// Samples are stored as f32 in the range [-1.0, 1.0]
/// Interleaved format: [L, R, L, R, ...] for stereo
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioBuffer {
    /// Create a new audio buffer
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        self.format.channels as usize
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate.as_hz()
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        match self.channels() {
            0 => 0,
            channels => self.samples.len() / channels,
        }
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate())
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check the invariants the mastering chain relies on
    ///
    /// - mono or stereo only
    /// - non-zero sample rate
    /// - whole frames (every channel has the same length)
    /// - finite samples
    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.format.channels) {
            return Err(MasteringError::validation(format!(
                "Unsupported channel count: {} (must be 1 or 2)",
                self.format.channels
            )));
        }
        if self.sample_rate() == 0 {
            return Err(MasteringError::validation("Sample rate must be non-zero"));
        }
        if self.samples.len() % self.channels() != 0 {
            return Err(MasteringError::validation(format!(
                "Sample count {} is not divisible by channel count {}",
                self.samples.len(),
                self.channels()
            )));
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(MasteringError::validation(format!(
                "Non-finite sample at index {}",
                index
            )));
        }
        Ok(())
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }

    /// Re-quantize to signed integers at the source bit depth
    ///
    /// Samples are clipped to [-1.0, 1.0] first. Full scale positive maps to
    /// the largest representable value rather than wrapping.
    pub fn quantize(&self) -> Vec<i32> {
        let bits = self.format.bits_per_sample.clamp(8, 32);
        let scale = 2.0_f64.powi(i32::from(bits) - 1);
        let max = scale - 1.0;
        self.samples
            .iter()
            .map(|&s| {
                let value = f64::from(s.clamp(-1.0, 1.0)) * scale;
                value.clamp(-scale, max) as i32
            })
            .collect()
    }
}
