//! DSP-specific errors
use thiserror::Error;

/// Result type alias using `DspError`
pub type Result<T> = std::result::Result<T, DspError>;

/// DSP error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    /// Filter parameters that cannot describe any filter (order 0, NaN cutoff)
    #[error("Invalid filter design: {0}")]
    InvalidDesign(String),

    /// Interleaved buffer does not hold whole frames
    #[error("Buffer of {len} samples is not a whole number of {channels}-channel frames")]
    InvalidLayout {
        /// Sample count
        len: usize,
        /// Channel count
        channels: usize,
    },

    /// A stage produced NaN or infinity
    #[error("{stage} produced a non-finite sample at index {index}")]
    NonFinite {
        /// Stage name
        stage: String,
        /// Sample index within the processed block
        index: usize,
    },
}

impl DspError {
    /// Name of the stage the error is attributed to
    pub fn stage(&self) -> &str {
        match self {
            Self::InvalidDesign(_) => "filter design",
            Self::InvalidLayout { .. } => "chunk layout",
            Self::NonFinite { stage, .. } => stage,
        }
    }
}

impl From<DspError> for mastering_core::MasteringError {
    fn from(err: DspError) -> Self {
        mastering_core::MasteringError::processing(err.stage().to_string(), err.to_string())
    }
}
