//! Reward scoring
//!
//! Each reported hit is attributed either to skill or to luck by a Bernoulli
//! draw on the current skill/luck ratio. Skill rewards fall off with distance
//! from the target center; luck rewards ignore it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::distributions::TruncatedNormal;
use crate::error::ConfigError;

/// Shape of the skill falloff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SkillMode {
    /// `precision = 1 - d / (radius + margin)`
    #[default]
    #[serde(rename = "linear_dist")]
    Linear,
    /// Linear precision squared
    #[serde(rename = "non_linear_dist")]
    NonLinear,
}

/// Distribution of luck rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LuckMode {
    /// Uniform integer in `[1, max_score]`
    #[default]
    Uniform,
    /// Truncated normal over `[min_score, max_score]`
    Normal,
}

/// Which branch produced a reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribution {
    Skill,
    Luck,
}

impl Attribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribution::Skill => "skill",
            Attribution::Luck => "luck",
        }
    }
}

/// Scorer parameters as stored in the experiment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub min_score: f64,
    pub max_score: f64,
    pub skill_type: SkillMode,
    pub rand_type: LuckMode,
    /// Mean of the luck reward in `normal` mode
    pub rand_mean: f64,
    /// Deviation of the luck reward in `normal` mode
    pub rand_sd: f64,
    /// Decimal places kept in rewards
    pub decimals: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_score: 10.0,
            skill_type: SkillMode::Linear,
            rand_type: LuckMode::Uniform,
            rand_mean: 5.0,
            rand_sd: 1.0,
            decimals: 0,
        }
    }
}

/// One scored hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub reward: f64,
    pub attribution: Attribution,
}

#[derive(Debug, Clone, Copy)]
enum LuckDraw {
    Uniform { top: i64 },
    Normal(TruncatedNormal),
}

/// Turns hit distances into rewards
#[derive(Debug, Clone)]
pub struct Scorer {
    radius: f64,
    min_score: f64,
    max_score: f64,
    skill: SkillMode,
    luck: LuckDraw,
    scale: f64,
    /// Ratios outside [0, 1] that were clamped
    clamped_ratios: u64,
}

impl Scorer {
    pub fn new(radius: f64, config: &ScorerConfig) -> Result<Self, ConfigError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::NotAbove {
                field: "mole_radius",
                min: 0.0,
                value: radius,
            });
        }
        for (field, value) in [("min_score", config.min_score), ("max_score", config.max_score)] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if config.min_score > config.max_score {
            return Err(ConfigError::InvertedBounds {
                low_field: "min_score",
                high_field: "max_score",
                low: config.min_score,
                high: config.max_score,
            });
        }
        let luck = match config.rand_type {
            LuckMode::Uniform => {
                if config.max_score < 1.0 {
                    return Err(ConfigError::RangeViolation {
                        field: "max_score",
                        min: 1.0,
                        max: f64::MAX,
                        value: config.max_score,
                    });
                }
                LuckDraw::Uniform {
                    top: config.max_score.floor() as i64,
                }
            }
            LuckMode::Normal => LuckDraw::Normal(TruncatedNormal::new(
                config.rand_mean,
                config.rand_sd,
                config.min_score,
                config.max_score,
            )?),
        };
        Ok(Self {
            radius,
            min_score: config.min_score,
            max_score: config.max_score,
            skill: config.skill_type,
            luck,
            scale: 10f64.powi(config.decimals.min(12) as i32),
            clamped_ratios: 0,
        })
    }

    /// Score a reported hit at `distance` with the current margin
    ///
    /// A `skill_luck_ratio` outside [0, 1] is clamped with a warning.
    ///
    /// # Panics
    ///
    /// If `distance` or `margin` is negative or not finite.
    pub fn score<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        distance: f64,
        margin: f64,
        skill_luck_ratio: f64,
    ) -> ScoreResult {
        assert!(
            distance.is_finite() && distance >= 0.0,
            "distance must be a finite non-negative number, got {distance}"
        );
        assert!(
            margin.is_finite() && margin >= 0.0,
            "margin must be a finite non-negative number, got {margin}"
        );
        let ratio = self.checked_ratio(skill_luck_ratio);
        let (raw, attribution) = if rng.random_bool(ratio) {
            (self.skill_reward(distance, margin), Attribution::Skill)
        } else {
            (self.luck_reward(rng), Attribution::Luck)
        };
        let reward = self.round(raw).clamp(self.min_score, self.max_score);
        ScoreResult {
            reward,
            attribution,
        }
    }

    fn checked_ratio(&mut self, ratio: f64) -> f64 {
        if (0.0..=1.0).contains(&ratio) {
            return ratio;
        }
        let clamped = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        self.clamped_ratios += 1;
        log::warn!("Skill/luck ratio {ratio} out of range, using {clamped}");
        clamped
    }

    fn skill_reward(&self, distance: f64, margin: f64) -> f64 {
        let linear = 1.0 - distance / (self.radius + margin);
        let precision = match self.skill {
            SkillMode::Linear => linear,
            // Squaring a negative precision would reward far misses
            SkillMode::NonLinear => linear.max(0.0).powi(2),
        };
        precision * self.max_score
    }

    fn luck_reward<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self.luck {
            LuckDraw::Uniform { top } => rng.random_range(1..=top) as f64,
            LuckDraw::Normal(dist) => dist.sample(rng),
        }
    }

    fn round(&self, value: f64) -> f64 {
        (value * self.scale).round() / self.scale
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    pub fn clamped_ratios(&self) -> u64 {
        self.clamped_ratios
    }
}
