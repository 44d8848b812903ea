//! Breathing pattern configuration.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Range the front ends allow for every field. The sequencer itself only
/// requires positive values.
pub const PRACTICAL_RANGE: RangeInclusive<u32> = 1..=20;

/// Durations (seconds) of one breathing set and the number of sets.
///
/// Immutable for the lifetime of a session; a new pattern means a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreathingConfig {
    pub inhale: u32,
    pub hold: u32,
    pub exhale: u32,
    pub sets: u32,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            inhale: 4,
            hold: 7,
            exhale: 8,
            sets: 4,
        }
    }
}

impl BreathingConfig {
    /// Build and validate a configuration.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidConfig`] naming the first zero field.
    pub fn new(inhale: u32, hold: u32, exhale: u32, sets: u32) -> Result<Self, ValidationError> {
        let config = Self {
            inhale,
            hold,
            exhale,
            sets,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("inhale", self.inhale),
            ("hold", self.hold),
            ("exhale", self.exhale),
            ("sets", self.sets),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ValidationError::InvalidConfig { field: *field }),
            None => Ok(()),
        }
    }

    /// `"inhale-hold-exhale"`, the key used to group history records.
    pub fn pattern(&self) -> String {
        format!("{}-{}-{}", self.inhale, self.hold, self.exhale)
    }

    pub fn set_duration_secs(&self) -> u64 {
        u64::from(self.inhale) + u64::from(self.hold) + u64::from(self.exhale)
    }

    pub fn nominal_duration_secs(&self) -> u64 {
        self.set_duration_secs() * u64::from(self.sets)
    }
}
