//! Soul Mastering Core
//!
//! Platform-agnostic types, settings and error handling shared by the
//! mastering DSP, loudness and engine crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `AudioBuffer`, `AudioFormat`, `SampleRate`
//! - **Settings**: `MasteringSettings`, `BandSettings` and the genre `PRESETS`
//! - **Collaborator Traits**: `AudioDecoder`, `AudioEncoder`
//! - **Error Handling**: Unified `MasteringError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use mastering_core::MasteringSettings;
//!
//! let settings = MasteringSettings::builder()
//!     .bass_boost_db(2.0)
//!     .stereo_width(1.2)
//!     .target_lufs(-14.0)
//!     .build()
//!     .unwrap();
//!
//! assert!(settings.target_lufs.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, MasteringError, Result};
pub use traits::{AudioDecoder, AudioEncoder};

pub use types::{
    // Audio types
    AudioBuffer, AudioFormat, SampleRate,
    // Settings
    BandSettings, MasteringSettings, SettingsBuilder, SettingsMessage,
    // Presets
    GenrePreset, PRESETS,
};
