//! Mastering settings
//!
//! One `MasteringSettings` is built per job (from a job message or the
//! builder), validated, and then only ever borrowed immutably by the
//! processing stages.
use super::preset::GenrePreset;
use crate::error::{MasteringError, Result};
use serde::{Deserialize, Serialize};

/// Lowest accepted loudness target
pub const MIN_TARGET_LUFS: f64 = -70.0;

/// Highest accepted loudness target
pub const MAX_TARGET_LUFS: f64 = 0.0;

/// Threshold and ratio for one compressor band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSettings {
    /// Threshold in dBFS (<= 0)
    pub threshold_db: f64,
    /// Compression ratio (>= 1, e.g. 4.0 means 4:1)
    pub ratio: f64,
}

impl BandSettings {
    /// Default low band (-25 dB, 6:1)
    pub const LOW: Self = Self::new(-25.0, 6.0);
    /// Default mid band (-20 dB, 3:1)
    pub const MID: Self = Self::new(-20.0, 3.0);
    /// Default high band (-15 dB, 4:1)
    pub const HIGH: Self = Self::new(-15.0, 4.0);

    /// Create band settings
    pub const fn new(threshold_db: f64, ratio: f64) -> Self {
        Self {
            threshold_db,
            ratio,
        }
    }

    fn validate(&self, band: &str) -> Result<()> {
        if !self.threshold_db.is_finite() || self.threshold_db > 0.0 {
            return Err(MasteringError::validation(format!(
                "{} band threshold must be a finite value <= 0 dB, got {}",
                band, self.threshold_db
            )));
        }
        if !self.ratio.is_finite() || self.ratio < 1.0 {
            return Err(MasteringError::validation(format!(
                "{} band ratio must be >= 1.0, got {}",
                band, self.ratio
            )));
        }
        Ok(())
    }
}

/// Settings record for one mastering job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteringSettings {
    /// Low shelf gain at 250 Hz in dB
    pub bass_boost_db: f64,
    /// Bell cut at 1 kHz in dB (positive value cuts)
    pub mid_cut_db: f64,
    /// Bell gain at 4 kHz in dB
    pub presence_boost_db: f64,
    /// High shelf gain at 8 kHz in dB
    pub treble_boost_db: f64,
    /// Saturation amount, 0-100
    pub saturation_percent: f64,
    /// Stereo width (0 = mono, 1 = unchanged)
    pub stereo_width: f64,
    /// Integrated loudness target; `None` skips normalization
    pub target_lufs: Option<f64>,
    /// Run the three-band compressor on every chunk
    pub multiband_enabled: bool,
    /// Low band (below 250 Hz)
    pub low_band: BandSettings,
    /// Mid band (250 Hz - 4 kHz)
    pub mid_band: BandSettings,
    /// High band (above 4 kHz)
    pub high_band: BandSettings,
}

impl Default for MasteringSettings {
    fn default() -> Self {
        Self {
            bass_boost_db: 0.0,
            mid_cut_db: 0.0,
            presence_boost_db: 0.0,
            treble_boost_db: 0.0,
            saturation_percent: 0.0,
            stereo_width: 1.0,
            target_lufs: None,
            multiband_enabled: false,
            low_band: BandSettings::LOW,
            mid_band: BandSettings::MID,
            high_band: BandSettings::HIGH,
        }
    }
}

impl MasteringSettings {
    /// Start building settings from defaults
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Parse a job-message settings object (flat keys)
    ///
    /// # Errors
    /// Malformed JSON, an unknown preset or out-of-range values
    pub fn from_json(json: &str) -> Result<Self> {
        let message: SettingsMessage = serde_json::from_str(json)?;
        message.into_settings()
    }

    /// Check every field is finite and within range
    pub fn validate(&self) -> Result<()> {
        let gains = [
            ("bass_boost_db", self.bass_boost_db),
            ("mid_cut_db", self.mid_cut_db),
            ("presence_boost_db", self.presence_boost_db),
            ("treble_boost_db", self.treble_boost_db),
        ];
        for (name, value) in gains {
            if !value.is_finite() {
                return Err(MasteringError::validation(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=100.0).contains(&self.saturation_percent) {
            return Err(MasteringError::validation(format!(
                "saturation_percent must be between 0 and 100, got {}",
                self.saturation_percent
            )));
        }

        if !self.stereo_width.is_finite() || self.stereo_width < 0.0 {
            return Err(MasteringError::validation(format!(
                "stereo_width must be a finite value >= 0, got {}",
                self.stereo_width
            )));
        }

        if let Some(target) = self.target_lufs {
            if !(MIN_TARGET_LUFS..=MAX_TARGET_LUFS).contains(&target) {
                return Err(MasteringError::validation(format!(
                    "target_lufs must be between {} and {}, got {}",
                    MIN_TARGET_LUFS, MAX_TARGET_LUFS, target
                )));
            }
        }

        self.low_band.validate("low")?;
        self.mid_band.validate("mid")?;
        self.high_band.validate("high")?;

        Ok(())
    }
}

/// Settings as they arrive in a job message
///
/// Field names follow the queue/UI wire format. Every field is optional;
/// missing ones fall back to the preset (EQ only) and then to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsMessage {
    /// Genre preset name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Low shelf gain in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bass_boost: Option<f64>,
    /// 1 kHz cut in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_cut: Option<f64>,
    /// 4 kHz gain in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_boost: Option<f64>,
    /// High shelf gain in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treble_boost: Option<f64>,
    /// Saturation percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
    /// Stereo width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Loudness target, `null` to skip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lufs: Option<f64>,
    /// Enable the multiband compressor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiband: Option<bool>,
    /// Low band threshold in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_thresh: Option<f64>,
    /// Low band ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_ratio: Option<f64>,
    /// Mid band threshold in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_thresh: Option<f64>,
    /// Mid band ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_ratio: Option<f64>,
    /// High band threshold in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_thresh: Option<f64>,
    /// High band ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_ratio: Option<f64>,
}

impl SettingsMessage {
    /// Resolve the message into validated settings
    pub fn into_settings(self) -> Result<MasteringSettings> {
        let mut settings = MasteringSettings::default();

        if let Some(name) = self.preset.as_deref() {
            let preset = GenrePreset::find(name).ok_or_else(|| {
                MasteringError::validation(format!(
                    "Unknown preset '{}' (expected one of: {})",
                    name,
                    GenrePreset::names().collect::<Vec<_>>().join(", ")
                ))
            })?;
            preset.apply_to(&mut settings);
        }

        let overrides = [
            (&mut settings.bass_boost_db, self.bass_boost),
            (&mut settings.mid_cut_db, self.mid_cut),
            (&mut settings.presence_boost_db, self.presence_boost),
            (&mut settings.treble_boost_db, self.treble_boost),
            (&mut settings.saturation_percent, self.saturation),
            (&mut settings.stereo_width, self.width),
            (&mut settings.low_band.threshold_db, self.low_thresh),
            (&mut settings.low_band.ratio, self.low_ratio),
            (&mut settings.mid_band.threshold_db, self.mid_thresh),
            (&mut settings.mid_band.ratio, self.mid_ratio),
            (&mut settings.high_band.threshold_db, self.high_thresh),
            (&mut settings.high_band.ratio, self.high_ratio),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        settings.target_lufs = self.lufs;
        settings.multiband_enabled = self.multiband.unwrap_or(false);

        settings.validate()?;
        Ok(settings)
    }
}

/// Fluent builder for `MasteringSettings`
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    settings: MasteringSettings,
}

impl SettingsBuilder {
    /// Start from a genre preset's EQ
    pub fn preset(mut self, preset: &GenrePreset) -> Self {
        preset.apply_to(&mut self.settings);
        self
    }

    /// Set the low shelf gain
    pub fn bass_boost_db(mut self, db: f64) -> Self {
        self.settings.bass_boost_db = db;
        self
    }

    /// Set the 1 kHz cut
    pub fn mid_cut_db(mut self, db: f64) -> Self {
        self.settings.mid_cut_db = db;
        self
    }

    /// Set the 4 kHz gain
    pub fn presence_boost_db(mut self, db: f64) -> Self {
        self.settings.presence_boost_db = db;
        self
    }

    /// Set the high shelf gain
    pub fn treble_boost_db(mut self, db: f64) -> Self {
        self.settings.treble_boost_db = db;
        self
    }

    /// Set the saturation amount (0-100)
    pub fn saturation_percent(mut self, percent: f64) -> Self {
        self.settings.saturation_percent = percent;
        self
    }

    /// Set the stereo width
    pub fn stereo_width(mut self, width: f64) -> Self {
        self.settings.stereo_width = width;
        self
    }

    /// Normalize to this integrated loudness
    pub fn target_lufs(mut self, lufs: f64) -> Self {
        self.settings.target_lufs = Some(lufs);
        self
    }

    /// Enable the multiband compressor with the given bands
    pub fn multiband(mut self, low: BandSettings, mid: BandSettings, high: BandSettings) -> Self {
        self.settings.multiband_enabled = true;
        self.settings.low_band = low;
        self.settings.mid_band = mid;
        self.settings.high_band = high;
        self
    }

    /// Enable the multiband compressor with default bands
    pub fn multiband_defaults(self) -> Self {
        self.multiband(BandSettings::LOW, BandSettings::MID, BandSettings::HIGH)
    }

    /// Validate and return the settings
    pub fn build(self) -> Result<MasteringSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_match_reference_bands() {
        let settings = MasteringSettings::default();
        assert_eq!(settings.stereo_width, 1.0);
        assert_eq!(settings.target_lufs, None);
        assert!(!settings.multiband_enabled);
        assert_eq!(settings.low_band, BandSettings::new(-25.0, 6.0));
        assert_eq!(settings.mid_band, BandSettings::new(-20.0, 3.0));
        assert_eq!(settings.high_band, BandSettings::new(-15.0, 4.0));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn parses_flat_job_message() {
        let settings = MasteringSettings::from_json(
            r#"{
                "bass_boost": 3.0,
                "mid_cut": 1.5,
                "saturation": 20,
                "width": 1.3,
                "lufs": -14,
                "multiband": true,
                "low_thresh": -30,
                "high_ratio": 8
            }"#,
        )
        .unwrap();

        assert_eq!(settings.bass_boost_db, 3.0);
        assert_eq!(settings.mid_cut_db, 1.5);
        assert_eq!(settings.saturation_percent, 20.0);
        assert_eq!(settings.stereo_width, 1.3);
        assert_eq!(settings.target_lufs, Some(-14.0));
        assert!(settings.multiband_enabled);
        assert_eq!(settings.low_band, BandSettings::new(-30.0, 6.0));
        assert_eq!(settings.high_band, BandSettings::new(-15.0, 8.0));
    }

    #[test]
    fn null_lufs_skips_normalization() {
        let settings = MasteringSettings::from_json(r#"{"lufs": null}"#).unwrap();
        assert_eq!(settings.target_lufs, None);
    }

    #[test]
    fn explicit_keys_override_preset() {
        let settings =
            MasteringSettings::from_json(r#"{"preset": "techno", "treble_boost": 0.0}"#).unwrap();
        assert_eq!(settings.bass_boost_db, 4.0);
        assert_eq!(settings.mid_cut_db, 3.0);
        assert_eq!(settings.treble_boost_db, 0.0);
    }

    #[test]
    fn unknown_preset_is_validation_error() {
        let err = MasteringSettings::from_json(r#"{"preset": "polka"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("polka"));
    }

    #[test]
    fn malformed_json_is_validation_error() {
        let err = MasteringSettings::from_json(r#"{"bass_boost": "loud"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn out_of_range_values_rejected() {
        let cases = [
            MasteringSettings {
                saturation_percent: 120.0,
                ..Default::default()
            },
            MasteringSettings {
                stereo_width: -0.5,
                ..Default::default()
            },
            MasteringSettings {
                bass_boost_db: f64::NAN,
                ..Default::default()
            },
            MasteringSettings {
                target_lufs: Some(3.0),
                ..Default::default()
            },
            MasteringSettings {
                mid_band: BandSettings::new(-20.0, 0.5),
                ..Default::default()
            },
            MasteringSettings {
                high_band: BandSettings::new(6.0, 4.0),
                ..Default::default()
            },
        ];

        for settings in cases {
            let err = settings.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{:?}", settings);
        }
    }

    #[test]
    fn builder_validates() {
        let settings = MasteringSettings::builder()
            .preset(GenrePreset::find("pop").unwrap())
            .saturation_percent(10.0)
            .multiband_defaults()
            .target_lufs(-14.0)
            .build()
            .unwrap();
        assert_eq!(settings.presence_boost_db, 3.5);
        assert!(settings.multiband_enabled);

        assert!(MasteringSettings::builder()
            .saturation_percent(-1.0)
            .build()
            .is_err());
    }

    #[test]
    fn settings_serde_round_trip() {
        let settings = MasteringSettings::builder()
            .bass_boost_db(2.0)
            .target_lufs(-9.0)
            .build()
            .unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        let back: MasteringSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
