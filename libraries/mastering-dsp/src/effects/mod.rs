//! Mastering processing stages
//!
//! Every stage operates on interleaved f32 samples in place. Stages hold
//! only settings and designed coefficients, never signal state between
//! calls.
//!
//! Available stages:
//! - **Saturator**: tanh harmonic saturation
//! - **Equalizer**: fixed four-band shelf/bell mastering EQ
//! - **StereoImager**: mid/side width
//! - **MultibandCompressor**: three-band split with per-band compression
//! - **SoftLimiter**: final soft-knee peak limiter

mod chain;
mod compressor;
mod eq;
mod limiter;
mod multiband;
mod saturation;
mod stereo;

pub use chain::{AudioStage, StageChain};
pub use compressor::{BandCompressor, BandTiming};
pub use eq::{
    apply_eq, mastering_bands, BandShape, EqBand, Equalizer, PreparedBand, HIGH_SHELF_HZ,
    LOW_SHELF_HZ, MID_BELL_HZ, PRESENCE_BELL_HZ,
};
pub use limiter::{limit, SoftLimiter, DEFAULT_KNEE, DEFAULT_THRESHOLD};
pub use multiband::{
    apply_multiband, split_bands, Bands, Crossover, MultibandCompressor, HIGH_CROSSOVER_HZ,
    LOW_CROSSOVER_HZ,
};
pub use saturation::{apply_saturation, Saturator};
pub use stereo::{apply_width, StereoImager};
