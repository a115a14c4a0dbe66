//! Core types for Soul Mastering
mod audio;
mod preset;
mod settings;

pub use audio::{AudioBuffer, AudioFormat, SampleRate};
pub use preset::{GenrePreset, PRESETS};
pub use settings::{
    BandSettings, MasteringSettings, SettingsBuilder, SettingsMessage, MAX_TARGET_LUFS,
    MIN_TARGET_LUFS,
};
