//! Core error types for Soul Mastering
use std::fmt;
use thiserror::Error;

/// Result type alias using `MasteringError`
pub type Result<T> = std::result::Result<T, MasteringError>;

/// Core error type for a mastering job
///
/// Every variant is fatal for the job it occurs in. The core never retries;
/// redelivery is owned by whoever feeds jobs to the engine.
#[derive(Error, Debug)]
pub enum MasteringError {
    /// Input could not be decoded (corrupt, truncated or unsupported)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Settings or input buffer rejected before any processing started
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unexpected failure inside a processing stage
    #[error("Processing error in {stage}: {reason}")]
    Processing {
        /// Stage that failed (e.g. "equalizer", "loudness")
        stage: String,
        /// Human-readable reason
        reason: String,
    },

    /// Output could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Job was cancelled between chunks
    #[error("Job cancelled after {completed_chunks} of {chunk_count} chunks")]
    Cancelled {
        /// Chunks fully processed before the cancellation was observed
        completed_chunks: usize,
        /// Total chunks planned for the job
        chunk_count: usize,
    },

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Coarse error classification, independent of the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`MasteringError::Decode`]
    Decode,
    /// See [`MasteringError::Validation`]
    Validation,
    /// See [`MasteringError::Processing`]
    Processing,
    /// See [`MasteringError::Encode`]
    Encode,
    /// See [`MasteringError::Cancelled`]
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decode => "DecodeError",
            Self::Validation => "ValidationError",
            Self::Processing => "ProcessingError",
            Self::Encode => "EncodeError",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

impl MasteringError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a processing error attributed to a stage
    pub fn processing(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create an encode error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Classify this error
    ///
    /// Malformed settings JSON is reported as a validation failure: the job
    /// message is the only thing we ever deserialize.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::Validation(_) | Self::Serialization(_) => ErrorKind::Validation,
            Self::Processing { .. } => ErrorKind::Processing,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}
