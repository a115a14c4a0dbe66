//! Genre EQ presets
//!
//! A preset is a partial override: it only supplies the four EQ gains.
//! Everything else in `MasteringSettings` keeps its default or the value
//! from the job message.
use super::settings::MasteringSettings;

/// Named EQ starting point for a genre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenrePreset {
    /// Preset identifier used in job messages
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Low shelf gain at 250 Hz
    pub bass_boost_db: f64,
    /// Bell cut at 1 kHz (positive cuts, negative boosts)
    pub mid_cut_db: f64,
    /// Bell gain at 4 kHz
    pub presence_boost_db: f64,
    /// High shelf gain at 8 kHz
    pub treble_boost_db: f64,
}

/// All built-in presets
pub static PRESETS: [GenrePreset; 4] = [
    GenrePreset {
        name: "techno",
        description: "Boosted sub-bass and highs, scooped mids for a powerful club sound.",
        bass_boost_db: 4.0,
        mid_cut_db: 3.0,
        presence_boost_db: 1.0,
        treble_boost_db: 3.0,
    },
    GenrePreset {
        name: "dubstep",
        description: "Aggressive low-end and crisp highs, with a significant mid-cut.",
        bass_boost_db: 5.0,
        mid_cut_db: 4.0,
        presence_boost_db: 2.0,
        treble_boost_db: 3.5,
    },
    GenrePreset {
        name: "pop",
        description: "Focused on vocal clarity with a solid low-end and bright highs.",
        bass_boost_db: 2.0,
        mid_cut_db: 0.0,
        presence_boost_db: 3.5,
        treble_boost_db: 2.5,
    },
    GenrePreset {
        name: "rock",
        description: "Warm low-mids for guitars and punchy presence for snare/vocals.",
        bass_boost_db: 1.5,
        // A negative cut is a boost
        mid_cut_db: -2.0,
        presence_boost_db: 2.5,
        treble_boost_db: 1.0,
    },
];

impl GenrePreset {
    /// Look up a preset by name (case-insensitive)
    pub fn find(name: &str) -> Option<&'static GenrePreset> {
        let name = name.trim();
        PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Names of all presets, in table order
    pub fn names() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|p| p.name)
    }

    /// Overwrite the EQ gains of `settings` with this preset
    pub fn apply_to(&self, settings: &mut MasteringSettings) {
        settings.bass_boost_db = self.bass_boost_db;
        settings.mid_cut_db = self.mid_cut_db;
        settings.presence_boost_db = self.presence_boost_db;
        settings.treble_boost_db = self.treble_boost_db;
    }
}
