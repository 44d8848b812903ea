//! Persistence contract used by the presentation layer.
//!
//! Reads never fail: a broken database or malformed payload is logged and
//! replaced by the documented fallback (built-in presets, empty history,
//! default audio settings). Writes return errors so the caller can log them,
//! but losing a write is never fatal to a session.

use chrono::{DateTime, Utc};

use super::database::{Database, SessionRecord};
use crate::audio::AudioSettings;
use crate::error::{Result, ValidationError};
use crate::presets::Preset;
use crate::session::{BreathingConfig, SessionSummary};

/// History keeps only this many most-recent records.
pub const HISTORY_CAP: usize = 100;

const USER_PRESETS_KEY: &str = "user_presets";
const AUDIO_SETTINGS_KEY: &str = "audio_settings";

pub struct BreathingStore {
    db: Database,
}

impl BreathingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the store in the default data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::new(Database::open()?))
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self::new(Database::open_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // ── History ──────────────────────────────────────────────────────

    /// Most recent first, at most [`HISTORY_CAP`] entries.
    pub fn get_history(&self) -> Vec<SessionRecord> {
        self.db.list_records(HISTORY_CAP).unwrap_or_else(|e| {
            tracing::warn!("history unavailable: {e}");
            Vec::new()
        })
    }

    /// Prepend a record, evicting the oldest beyond [`HISTORY_CAP`].
    pub fn append_record(&self, record: &SessionRecord) -> Result<()> {
        self.db.insert_record(record, HISTORY_CAP)?;
        Ok(())
    }

    /// Build a record from a finished session and append it.
    pub fn record_session(
        &self,
        summary: &SessionSummary,
        preset_name: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<SessionRecord> {
        let record = SessionRecord::from_summary(summary, preset_name, at);
        self.append_record(&record)?;
        Ok(record)
    }

    pub fn clear_history(&self) -> Result<usize> {
        self.db.clear_records()
    }

    // ── Presets ──────────────────────────────────────────────────────

    /// `defaults` followed by stored user presets, in storage order.
    pub fn get_presets(&self, defaults: &[Preset]) -> Vec<Preset> {
        let mut presets = defaults.to_vec();
        presets.extend(self.user_presets());
        presets
    }

    /// Persist the non-default entries of `presets`.
    pub fn save_presets(&self, presets: &[Preset]) -> Result<()> {
        let user: Vec<&Preset> = presets.iter().filter(|p| !p.is_default).collect();
        let json = serde_json::to_string(&user)?;
        self.db.kv_set(USER_PRESETS_KEY, &json)?;
        Ok(())
    }

    /// Add a user preset, replacing an existing user preset of the same name.
    /// Returns the merged preset list.
    ///
    /// # Errors
    /// Rejects invalid configs and names taken by a built-in preset.
    pub fn save_preset(
        &self,
        defaults: &[Preset],
        name: &str,
        config: BreathingConfig,
    ) -> Result<Vec<Preset>> {
        config.validate()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "preset name cannot be empty".into(),
            }
            .into());
        }
        if defaults.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: format!("'{name}' is a built-in preset"),
            }
            .into());
        }

        let mut user = self.user_presets();
        user.retain(|p| !p.name.eq_ignore_ascii_case(name));
        user.push(Preset::user(name, config));
        self.save_presets(&user)?;

        let mut merged = defaults.to_vec();
        merged.extend(user);
        Ok(merged)
    }

    /// Remove a user preset by name. Built-ins cannot be removed.
    pub fn delete_preset(&self, name: &str) -> Result<bool> {
        let mut user = self.user_presets();
        let before = user.len();
        user.retain(|p| !p.name.eq_ignore_ascii_case(name));
        if user.len() == before {
            return Ok(false);
        }
        self.save_presets(&user)?;
        Ok(true)
    }

    fn user_presets(&self) -> Vec<Preset> {
        let json = match self.db.kv_get(USER_PRESETS_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("user presets unavailable: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Preset>>(&json) {
            Ok(presets) => presets
                .into_iter()
                .filter(|p| p.config.validate().is_ok())
                .map(|p| Preset {
                    is_default: false,
                    ..p
                })
                .collect(),
            Err(e) => {
                tracing::warn!("ignoring malformed user presets: {e}");
                Vec::new()
            }
        }
    }

    // ── Audio ────────────────────────────────────────────────────────

    pub fn get_audio_settings(&self) -> AudioSettings {
        match self.db.kv_get(AUDIO_SETTINGS_KEY) {
            Ok(Some(json)) => serde_json::from_str::<AudioSettings>(&json)
                .map(|s| {
                    let volume = s.volume;
                    s.with_volume(volume)
                })
                .unwrap_or_else(|e| {
                    tracing::warn!("ignoring malformed audio settings: {e}");
                    AudioSettings::default()
                }),
            Ok(None) => AudioSettings::default(),
            Err(e) => {
                tracing::warn!("audio settings unavailable: {e}");
                AudioSettings::default()
            }
        }
    }

    pub fn save_audio_settings(&self, settings: &AudioSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.db.kv_set(AUDIO_SETTINGS_KEY, &json)?;
        Ok(())
    }
}
