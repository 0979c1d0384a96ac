//! Game settings and preferences
//!
//! Persisted separately from high scores: `settings.json` natively,
//! LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::highscores::{self, StorageError};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Lives at the start of a run
    pub fn lives(&self) -> u8 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal | Difficulty::Hard => 3,
        }
    }

    /// Scroll speed at progression 0
    pub fn speed_base(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal | Difficulty::Hard => 1.0,
        }
    }

    /// Scroll speed added at full progression
    pub fn speed_gain(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    /// Ticks until the progression weight reaches 1
    pub fn progression_ticks(&self) -> f32 {
        let minutes = match self {
            Difficulty::Easy => 4.0,
            Difficulty::Normal => 3.0,
            Difficulty::Hard => 2.0,
        };
        minutes * 60.0 * 60.0
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Fixed run seed; `None` picks a fresh one per run
    pub seed: Option<u64>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no screen shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            seed: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key (file stem natively)
    const STORAGE_KEY: &'static str = "pig_plunge_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        !self.reduced_motion
    }

    /// Seed for the next run
    pub fn run_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load() -> Self {
        match highscores::read_storage(Self::STORAGE_KEY).and_then(|json| match json {
            Some(json) => Self::from_json(&json).map(Some),
            None => Ok(None),
        }) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged and otherwise ignored
    pub fn save(&self) {
        let result = self
            .to_json()
            .and_then(|json| highscores::write_storage(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_round_trip_names() {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_harder_means_faster() {
        assert!(Difficulty::Hard.speed_gain() > Difficulty::Normal.speed_gain());
        assert!(Difficulty::Hard.progression_ticks() < Difficulty::Easy.progression_ticks());
        assert!(Difficulty::Easy.lives() > Difficulty::Hard.lives());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"difficulty":"Hard","seed":42}"#)
            .unwrap_or_default();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.music_volume, 0.7);
        assert_eq!(settings.run_seed(), 42);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(StorageError::Json(_))
        ));
    }
}
