//! Soul Mastering DSP
//!
//! Filter design and the per-chunk and final processing stages of the
//! mastering chain.
//!
//! This crate provides:
//! - Butterworth low/high/band-pass design as second-order sections
//! - Saturation, four-band EQ, stereo width and multiband compression
//! - The final soft-knee limiter
//! - A stage chain architecture for running them in order
//!
//! # Example
//!
//! ```rust
//! use mastering_core::MasteringSettings;
//! use mastering_dsp::effects::{SoftLimiter, StageChain};
//!
//! let settings = MasteringSettings::builder()
//!     .bass_boost_db(3.0)
//!     .stereo_width(1.2)
//!     .build()
//!     .unwrap();
//!
//! let chain = StageChain::for_chunks(&settings, 44_100).unwrap();
//!
//! let mut samples = vec![0.25_f32; 4_410 * 2]; // 100 ms stereo
//! chain.process(&mut samples, 2).unwrap();
//! SoftLimiter::new().apply(&mut samples);
//! ```

#![forbid(unsafe_code)]

pub mod effects;
mod error;
pub mod filters;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::{DspError, Result};
pub use filters::{
    design_bandpass, design_highpass, design_lowpass, design_peak, design_shelf, Biquad,
    ShelfKind, SosFilter,
};
