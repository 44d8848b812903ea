//! Named breathing patterns.
//!
//! Built-in presets ship with the app and are never persisted; user presets
//! are stored and always listed after the built-ins.

use serde::{Deserialize, Serialize};

use crate::session::BreathingConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub config: BreathingConfig,
    #[serde(default)]
    pub is_default: bool,
}

impl Preset {
    pub fn user(name: impl Into<String>, config: BreathingConfig) -> Self {
        Self {
            name: name.into(),
            config,
            is_default: false,
        }
    }

    fn builtin(name: &str, inhale: u32, hold: u32, exhale: u32, sets: u32) -> Self {
        Self {
            name: name.to_string(),
            config: BreathingConfig {
                inhale,
                hold,
                exhale,
                sets,
            },
            is_default: true,
        }
    }
}

pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::builtin("4-7-8 Breathing", 4, 7, 8, 4),
        Preset::builtin("5-5-5 Balanced Breathing", 5, 5, 5, 5),
        Preset::builtin("6-6-6 Deep Breathing", 6, 6, 6, 3),
    ]
}

/// Case-insensitive lookup by name.
pub fn find_preset<'a>(presets: &'a [Preset], name: &str) -> Option<&'a Preset> {
    presets.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_valid_and_flagged() {
        let presets = default_presets();
        assert_eq!(presets.len(), 3);
        for preset in &presets {
            assert!(preset.is_default);
            assert!(preset.config.validate().is_ok());
        }
        assert_eq!(presets[2].config.sets, 3);
    }

    #[test]
    fn find_ignores_case() {
        let presets = default_presets();
        let found = find_preset(&presets, "4-7-8 breathing").unwrap();
        assert_eq!(found.config.pattern(), "4-7-8");
        assert!(find_preset(&presets, "box").is_none());
    }
}
