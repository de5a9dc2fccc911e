//! Session settings and engine configuration.
//!
//! `DuelSettings` arrive with every `start_session` call and are range-checked
//! before anything else happens. `EngineConfig` holds the fixed pacing and
//! scoring constants and can be loaded from TOML.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::duel_engine::models::Tier;
use crate::duel_engine::simulator::Modifiers;
use crate::error::ConfigError;

pub const QUESTION_COUNT_RANGE: RangeInclusive<usize> = 1..=50;
pub const TIME_LIMIT_SECS_RANGE: RangeInclusive<u32> = 3..=120;
/// Effective accuracy is clamped anyway, so the full swing is allowed.
/// Presets stay within ±20.
pub const ACCURACY_MODIFIER_RANGE: RangeInclusive<f64> = -100.0..=100.0;
pub const SPEED_MULTIPLIER_RANGE: RangeInclusive<f64> = 0.5..=2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelSettings {
    pub tier: Tier,
    pub question_count: usize,
    pub time_limit_secs: u32,
    pub accuracy_modifier: f64,
    pub speed_multiplier: f64,
}

impl Default for DuelSettings {
    fn default() -> Self {
        DuelSettings {
            tier: Tier::Beginner,
            question_count: 10,
            time_limit_secs: 15,
            accuracy_modifier: 0.0,
            speed_multiplier: 1.0,
        }
    }
}

fn check(field: &'static str, value: f64, range: RangeInclusive<f64>) -> Result<(), ConfigError> {
    // NaN fails `contains`, which is what we want.
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

impl DuelSettings {
    /// Preset knobs for a tier.
    pub fn for_tier(tier: Tier) -> Self {
        let (accuracy_modifier, speed_multiplier) = match tier {
            Tier::Beginner     => (-10.0, 0.8),
            Tier::Intermediate => (0.0, 1.0),
            Tier::Advanced     => (10.0, 1.25),
        };
        DuelSettings { tier, accuracy_modifier, speed_multiplier, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let as_f64 = |r: &RangeInclusive<usize>| *r.start() as f64..=*r.end() as f64;
        check("question_count", self.question_count as f64, as_f64(&QUESTION_COUNT_RANGE))?;
        check(
            "time_limit_secs",
            f64::from(self.time_limit_secs),
            f64::from(*TIME_LIMIT_SECS_RANGE.start())..=f64::from(*TIME_LIMIT_SECS_RANGE.end()),
        )?;
        check("accuracy_modifier", self.accuracy_modifier, ACCURACY_MODIFIER_RANGE)?;
        check("speed_multiplier", self.speed_multiplier, SPEED_MULTIPLIER_RANGE)?;
        Ok(())
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            accuracy_modifier: self.accuracy_modifier,
            speed_multiplier: self.speed_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lead-in before the first answer window opens.
    pub countdown_ms: u64,
    /// Longest the reveal waits for the opponent after the player submits.
    pub reply_cap_ms: u64,
    /// Extra points for a correct player answer that beats the opponent.
    pub speed_bonus_points: u32,
    pub default_settings: DuelSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            countdown_ms: 3000,
            reply_cap_ms: 2000,
            speed_bonus_points: 50,
            default_settings: DuelSettings::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.default_settings.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }
}
