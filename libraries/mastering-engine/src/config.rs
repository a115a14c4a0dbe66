//! Engine configuration
use crate::chunker::DEFAULT_CHUNK_DURATION_MS;
use mastering_core::{MasteringError, Result};
use mastering_dsp::effects::{SoftLimiter, DEFAULT_KNEE, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, read from the working directory when present
pub const CONFIG_FILE: &str = "mastering.toml";

/// Environment variable prefix (`MASTERING_CHUNK_DURATION_MS=10000`)
pub const ENV_PREFIX: &str = "MASTERING";

/// Process-wide engine settings
///
/// These are operator knobs, not per-job settings: per-job values arrive in
/// the job message as [`mastering_core::MasteringSettings`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Nominal chunk duration in milliseconds
    #[serde(default = "default_chunk_duration_ms")]
    pub chunk_duration_ms: u64,

    /// Final limiter threshold (linear)
    #[serde(default = "default_limiter_threshold")]
    pub limiter_threshold: f64,

    /// Final limiter knee constant (linear)
    #[serde(default = "default_limiter_knee")]
    pub limiter_knee: f64,

    /// Process chunks on the rayon pool (needs the `parallel` feature)
    #[serde(default)]
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_duration_ms: default_chunk_duration_ms(),
            limiter_threshold: default_limiter_threshold(),
            limiter_knee: default_limiter_knee(),
            parallel: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `mastering.toml` (if it exists) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from `path` (if it exists) and environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }

        // Field names contain underscores, so only the prefix uses a single one
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_duration_ms == 0 {
            return Err(MasteringError::validation(
                "chunk_duration_ms must be greater than zero",
            ));
        }

        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.limiter_threshold) || !positive(self.limiter_knee) {
            return Err(MasteringError::validation(format!(
                "Limiter threshold and knee must be positive (got {} / {})",
                self.limiter_threshold, self.limiter_knee
            )));
        }
        if self.limiter_threshold + self.limiter_knee > 1.0 {
            return Err(MasteringError::validation(format!(
                "Limiter ceiling {} exceeds full scale",
                self.limiter_threshold + self.limiter_knee
            )));
        }

        Ok(())
    }

    /// Final limiter for these settings
    pub fn limiter(&self) -> SoftLimiter {
        SoftLimiter::with_params(self.limiter_threshold, self.limiter_knee)
    }
}

fn config_error(err: config::ConfigError) -> MasteringError {
    MasteringError::validation(format!("Invalid engine configuration: {}", err))
}

// Default values
fn default_chunk_duration_ms() -> u64 {
    DEFAULT_CHUNK_DURATION_MS
}

fn default_limiter_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_limiter_knee() -> f64 {
    DEFAULT_KNEE
}
