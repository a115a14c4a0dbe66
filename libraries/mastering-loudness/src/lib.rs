//! Soul Mastering Loudness
//!
//! Integrated loudness measurement and normalization for the mastering
//! engine.
//!
//! # Features
//!
//! - **Measurement**: ITU-R BS.1770 / EBU R128 integrated loudness with
//!   K-weighting and absolute/relative gating (via `ebur128`)
//! - **Normalization**: one static gain that moves a programme to a target
//!   LUFS value
//!
//! Multichannel programmes are averaged to mono before metering, so a
//! stereo track with identical channels measures the same as its mono
//! version.
//!
//! # Example
//!
//! ```rust
//! use mastering_core::{AudioBuffer, AudioFormat, SampleRate};
//! use mastering_loudness::LoudnessNormalizer;
//!
//! // 2 seconds of a quiet 1 kHz tone
//! let samples: Vec<f32> = (0..88_200)
//!     .map(|i| 0.1 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 44_100.0).sin())
//!     .collect();
//! let format = AudioFormat::new(SampleRate::new(44_100), 1, 16);
//! let mut buffer = AudioBuffer::new(samples, format);
//!
//! let outcome = LoudnessNormalizer::new(-14.0).normalize(&mut buffer).unwrap();
//! assert!(outcome.applied_gain_db > 0.0);
//! ```

#![deny(unsafe_code)]

mod analyzer;
mod error;
mod normalizer;

pub use analyzer::{
    measure_integrated, LoudnessAnalyzer, LoudnessInfo, MAX_CHANNELS, SUPPORTED_SAMPLE_RATES,
};
pub use error::{LoudnessError, Result};
pub use normalizer::{LoudnessNormalizer, NormalizationOutcome};

/// Streaming platform target (Spotify, YouTube, Tidal)
pub const EBU_R128_STREAMING_LUFS: f64 = -14.0;

/// EBU R128 broadcast target
pub const EBU_R128_BROADCAST_LUFS: f64 = -23.0;

/// Length of one gating block; shorter programmes have no integrated loudness
pub const GATING_BLOCK_SECONDS: f64 = 0.4;
