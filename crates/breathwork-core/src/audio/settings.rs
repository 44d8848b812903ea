use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Ambient loop played under the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSound {
    #[default]
    None,
    Waves,
    Rain,
    Whitenoise,
}

impl std::str::FromStr for BackgroundSound {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(BackgroundSound::None),
            "waves" => Ok(BackgroundSound::Waves),
            "rain" => Ok(BackgroundSound::Rain),
            "whitenoise" => Ok(BackgroundSound::Whitenoise),
            other => Err(ValidationError::InvalidValue {
                field: "background_sound".into(),
                message: format!("unknown background sound '{other}'"),
            }),
        }
    }
}

/// User audio preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// 0-100
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_true")]
    pub voice_guide: bool,
    #[serde(default = "default_true")]
    pub sound_effects: bool,
    #[serde(default)]
    pub background_sound: BackgroundSound,
}

pub const MAX_VOLUME: u8 = 100;

fn default_volume() -> u8 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            voice_guide: true,
            sound_effects: true,
            background_sound: BackgroundSound::None,
        }
    }
}

impl AudioSettings {
    /// Set the volume, clamped to 0-100.
    #[must_use]
    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume.min(MAX_VOLUME);
        self
    }

    /// Volume as a 0.0-1.0 gain.
    pub fn gain(&self) -> f32 {
        f32::from(self.volume.min(MAX_VOLUME)) / f32::from(MAX_VOLUME)
    }

    pub fn is_muted(&self) -> bool {
        self.volume == 0
    }
}
