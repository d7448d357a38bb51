//! Experiment configuration
//!
//! One typed record per session, persisted as JSON. Section names follow the
//! experimenter's record layout (`main_game`, `scorer`, `margin_drifter`,
//! `hit_checker`). Scoring-relevant fields have no serde defaults: a record
//! missing one is rejected rather than silently filled in.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{MARGIN_START, MOLE_RADIUS};
use crate::engine::drift::DriftConfig;
use crate::engine::hit::HitCheckerConfig;
use crate::engine::scorer::ScorerConfig;
use crate::engine::state::{SessionStage, SkillLuckConfig};
use crate::error::ConfigError;

/// Labels describing which experimental condition a record belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsMeta {
    pub cond_set_name: String,
}

impl Default for ConditionsMeta {
    fn default() -> Self {
        Self {
            cond_set_name: "Default".to_string(),
        }
    }
}

/// Game geometry and session pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// True target radius
    #[serde(rename = "MOLE_RADIUS")]
    pub mole_radius: f64,
    /// Margin before the first drift step
    #[serde(rename = "MARGIN_START")]
    pub margin_start: f64,

    // === Stages ===
    /// Whether the session opens with a warm-up demo
    pub demo: bool,
    /// Attempts in the demo
    pub demo_len: u32,
    /// Attempts per stage
    pub stage_length: u32,
    /// Number of stages after the demo
    pub stages: u32,
    /// Explicit thresholds; overrides the lengths above when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_boundaries: Option<Vec<u32>>,

    // === Feedback ===
    /// Reported hits between rating pauses (0 disables rating pauses)
    pub feedback_limit: u32,
    /// Shorten the pop-up interval as stages progress
    #[serde(default)]
    pub stage_time_change: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mole_radius: MOLE_RADIUS,
            margin_start: MARGIN_START,
            demo: true,
            demo_len: 10,
            stage_length: 50,
            stages: 4,
            stage_boundaries: None,
            feedback_limit: 5,
            stage_time_change: false,
        }
    }
}

/// Complete experiment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub conditions_meta: ConditionsMeta,
    pub main_game: GameConfig,
    pub scorer: ScorerConfig,
    pub margin_drifter: DriftConfig,
    pub hit_checker: HitCheckerConfig,
    #[serde(default)]
    pub skill_luck: SkillLuckConfig,
}

impl SessionConfig {
    /// Build from a plain key-value mapping
    pub fn from_map(map: Map<String, Value>) -> Result<Self, ConfigError> {
        Self::from_value(Value::Object(map))
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a record from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded configuration '{}' from {}",
            config.conditions_meta.cond_set_name,
            path.display()
        );
        Ok(config)
    }

    /// Validate, then write the record to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.validate()?;
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?)?;
        log::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check the cross-section invariants
    ///
    /// Component constructors repeat their own checks; this catches a bad
    /// record before any component is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.main_game;
        if !(game.mole_radius.is_finite() && game.mole_radius > 0.0) {
            return Err(ConfigError::NotAbove {
                field: "MOLE_RADIUS",
                min: 0.0,
                value: game.mole_radius,
            });
        }
        if !(game.margin_start.is_finite() && game.margin_start >= 0.0) {
            return Err(ConfigError::RangeViolation {
                field: "MARGIN_START",
                min: 0.0,
                max: f64::MAX,
                value: game.margin_start,
            });
        }
        self.margin_drifter.validate()?;
        match self.margin_drifter.lower_bound(game.margin_start) {
            Some(low) if low >= 0.0 => {}
            _ => return Err(ConfigError::UnboundedMargin),
        }
        self.skill_luck.validate()?;
        SessionStage::new(self.stage_boundaries()?, game.demo)?;
        Ok(())
    }

    /// Stage thresholds, explicit or derived from the stage lengths
    pub fn stage_boundaries(&self) -> Result<Vec<u32>, ConfigError> {
        let game = &self.main_game;
        if let Some(explicit) = &game.stage_boundaries {
            return Ok(explicit.clone());
        }
        if game.stage_length == 0 {
            return Err(ConfigError::ZeroCount {
                field: "stage_length",
            });
        }
        if game.stages == 0 {
            return Err(ConfigError::ZeroCount { field: "stages" });
        }
        if game.demo && game.demo_len == 0 {
            return Err(ConfigError::ZeroCount { field: "demo_len" });
        }
        let demo_len = if game.demo { game.demo_len } else { 0 };
        Ok(SessionStage::boundaries_from_lengths(
            demo_len,
            game.stage_length,
            game.stages,
        ))
    }
}
