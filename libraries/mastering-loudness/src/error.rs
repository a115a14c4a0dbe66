//! Error types for loudness measurement

use mastering_core::MasteringError;
use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur while metering or normalizing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoudnessError {
    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(u32),

    /// Interleaved input did not contain whole frames
    #[error("Sample count {len} is not divisible by channel count {channels}")]
    PartialFrame { len: usize, channels: u32 },

    /// Normalization target is not a usable LUFS value
    #[error("Invalid loudness target: {0} LUFS")]
    InvalidTarget(f64),

    /// EBU R128 analysis error
    #[error("EBU R128 analysis failed: {0}")]
    AnalysisError(String),
}

impl From<ebur128::Error> for LoudnessError {
    fn from(err: ebur128::Error) -> Self {
        Self::AnalysisError(format!("{:?}", err))
    }
}

impl From<LoudnessError> for MasteringError {
    fn from(err: LoudnessError) -> Self {
        match err {
            LoudnessError::InvalidTarget(_)
            | LoudnessError::InvalidSampleRate(_)
            | LoudnessError::InvalidChannelCount(_) => MasteringError::validation(err.to_string()),
            other => MasteringError::processing("loudness", other.to_string()),
        }
    }
}
