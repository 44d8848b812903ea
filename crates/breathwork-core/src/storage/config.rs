//! TOML-based application configuration.
//!
//! Stores app-wide defaults:
//! - The breathing pattern used when no preset is chosen
//! - Log level
//!
//! Configuration is stored at `~/.config/breathwork/config.toml`. Presets,
//! history and audio settings live in the database, not here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::session::BreathingConfig;

/// Pattern used by `run` when neither a preset nor explicit durations are given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_inhale")]
    pub inhale: u32,
    #[serde(default = "default_hold")]
    pub hold: u32,
    #[serde(default = "default_exhale")]
    pub exhale: u32,
    #[serde(default = "default_sets")]
    pub sets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/breathwork/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionDefaults,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_inhale() -> u32 {
    4
}
fn default_hold() -> u32 {
    7
}
fn default_exhale() -> u32 {
    8
}
fn default_sets() -> u32 {
    4
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            inhale: default_inhale(),
            hold: default_hold(),
            exhale: default_exhale(),
            sets: default_sets(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot replace a whole section".into()));
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default configuration: {e}");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Every leaf value as `(dot.path, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (key, child) in map {
                        let path = if prefix.is_empty() {
                            key.clone()
                        } else {
                            format!("{prefix}.{key}")
                        };
                        flatten(&path, child, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        match serde_json::to_value(self) {
            Ok(json) => flatten("", &json, &mut out),
            Err(e) => tracing::warn!("cannot list configuration: {e}"),
        }
        out
    }

    /// Update a value in memory by dot-separated key, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate().map_err(|message| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        })?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    fn validate(&self) -> Result<(), String> {
        self.breathing_config().map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn breathing_config(&self) -> Result<BreathingConfig, crate::error::ValidationError> {
        let s = &self.session;
        BreathingConfig::new(s.inhale, s.hold, s.exhale, s.sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.session.hold, 7);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[session]\nsets = 2\n").unwrap();
        assert_eq!(parsed.session.sets, 2);
        assert_eq!(parsed.session.inhale, 4);
    }

    #[test]
    fn tick_interval_is_not_configurable() {
        // Files written before the key was dropped still load.
        let parsed: Config = toml::from_str("[timing]\ntick_interval_ms = 10\n").unwrap();
        assert_eq!(parsed.session.sets, 4);
        assert!(parsed.get("timing.tick_interval_ms").is_none());

        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timing.tick_interval_ms", "100"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.inhale").as_deref(), Some("4"));
        assert_eq!(cfg.get("logging.level").as_deref(), Some("info"));
        assert!(cfg.get("session.missing").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn entries_cover_every_gettable_key() {
        let cfg = Config::default();
        let entries = cfg.entries();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"session.inhale"));
        assert!(keys.contains(&"session.sets"));
        assert!(keys.contains(&"logging.level"));
        for (key, value) in &entries {
            assert_eq!(cfg.get(key).as_deref(), Some(value.as_str()));
        }
    }

    #[test]
    fn apply_updates_and_validates() {
        let mut cfg = Config::default();
        cfg.apply("session.sets", "6").unwrap();
        assert_eq!(cfg.session.sets, 6);
        cfg.apply("logging.level", "debug").unwrap();
        assert_eq!(cfg.logging.level, "debug");

        assert!(matches!(
            cfg.apply("session.hold", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.session.hold, 7);
        assert!(matches!(
            cfg.apply("session.speed", "2"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.apply("session", "5"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.session.exhale, 8);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.apply("session.exhale", "6").unwrap();
        cfg.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.breathing_config().unwrap().pattern(), "4-7-6");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "session = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
