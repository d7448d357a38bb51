//! Hit checking
//!
//! Three nested verdicts per attempt: the geometric hit, the hit with the
//! drifted margin added to the radius, and the hit the participant is told
//! about. The last one may be randomized.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::distributions::TruncatedNormal;
use crate::error::ConfigError;

/// How the reported hit is derived from the margin hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HitMode {
    /// Every margin hit is reported
    #[default]
    Standard,
    /// Margin hits are reported with a distance-decaying probability plus luck
    Binomial,
}

impl HitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitMode::Standard => "Standard",
            HitMode::Binomial => "Binomial",
        }
    }

    pub fn is_probabilistic(&self) -> bool {
        matches!(self, HitMode::Binomial)
    }
}

/// Hit checker parameters as stored in the experiment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitCheckerConfig {
    pub hit_type: HitMode,
    pub luck_mean: f64,
    pub luck_sd: f64,
    pub luck_low_bnd: f64,
    pub luck_high_bnd: f64,
    /// Difficulty factor scaling the distance ratio
    pub diff_fact: f64,
}

impl Default for HitCheckerConfig {
    fn default() -> Self {
        Self {
            hit_type: HitMode::Standard,
            luck_mean: 0.0,
            luck_sd: 0.05,
            luck_low_bnd: -0.1,
            luck_high_bnd: 0.1,
            diff_fact: 1.0,
        }
    }
}

/// Result of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HitOutcome {
    pub true_hit: bool,
    pub margin_hit: bool,
    pub reported_hit: bool,
}

impl HitOutcome {
    pub const MISS: Self = Self {
        true_hit: false,
        margin_hit: false,
        reported_hit: false,
    };

    pub fn as_tuple(&self) -> (bool, bool, bool) {
        (self.true_hit, self.margin_hit, self.reported_hit)
    }

    pub fn class(&self) -> HitClass {
        match (self.true_hit, self.reported_hit) {
            (true, true) => HitClass::TrueHit,
            (true, false) => HitClass::FakeMiss,
            (false, true) => HitClass::FakeHit,
            (false, false) => HitClass::TrueMiss,
        }
    }
}

/// Geometric truth versus what the participant was told
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitClass {
    TrueHit,
    FakeMiss,
    FakeHit,
    TrueMiss,
}

impl HitClass {
    pub const ALL: [HitClass; 4] = [
        HitClass::TrueHit,
        HitClass::FakeMiss,
        HitClass::FakeHit,
        HitClass::TrueMiss,
    ];
}

/// Decides hits for targets of a fixed radius
#[derive(Debug, Clone)]
pub struct HitChecker {
    radius: f64,
    mode: HitMode,
    difficulty: f64,
    luck: TruncatedNormal,
    /// Probabilities pushed back into [0, 1] by the luck term
    clamped_probabilities: u64,
}

impl HitChecker {
    pub fn new(radius: f64, config: &HitCheckerConfig) -> Result<Self, ConfigError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::NotAbove {
                field: "mole_radius",
                min: 0.0,
                value: radius,
            });
        }
        if !(config.diff_fact.is_finite() && config.diff_fact >= 0.0) {
            return Err(ConfigError::RangeViolation {
                field: "diff_fact",
                min: 0.0,
                max: f64::MAX,
                value: config.diff_fact,
            });
        }
        let luck = TruncatedNormal::new(
            config.luck_mean,
            config.luck_sd,
            config.luck_low_bnd,
            config.luck_high_bnd,
        )?;
        Ok(Self {
            radius,
            mode: config.hit_type,
            difficulty: config.diff_fact,
            luck,
            clamped_probabilities: 0,
        })
    }

    /// Evaluate one attempt
    ///
    /// # Panics
    ///
    /// If `distance` or `margin` is negative or not finite.
    pub fn check<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        attempt_active: bool,
        distance: f64,
        margin: f64,
    ) -> HitOutcome {
        assert!(
            distance.is_finite() && distance >= 0.0,
            "distance must be a finite non-negative number, got {distance}"
        );
        assert!(
            margin.is_finite() && margin >= 0.0,
            "margin must be a finite non-negative number, got {margin}"
        );

        if !attempt_active {
            return HitOutcome::MISS;
        }

        let true_hit = distance <= self.radius;
        let margin_hit = distance < self.radius + margin;
        let reported_hit = if !margin_hit {
            false
        } else if self.mode.is_probabilistic() {
            let prob = self.hit_probability(rng, distance, margin);
            rng.random_bool(prob)
        } else {
            true
        };

        let outcome = HitOutcome {
            true_hit,
            margin_hit,
            reported_hit,
        };
        assert!(
            !outcome.reported_hit || outcome.margin_hit,
            "reported hit without margin hit: {outcome:?}"
        );
        outcome
    }

    /// Chance of reporting a margin hit at `distance`, luck included
    fn hit_probability<R: Rng + ?Sized>(&mut self, rng: &mut R, distance: f64, margin: f64) -> f64 {
        let ratio = distance / (self.radius + margin);
        debug_assert!((0.0..=1.0).contains(&ratio), "distance ratio {ratio}");
        let base = 1.0 / (1.0 + ratio * self.difficulty);
        let raw = base + self.luck.sample(rng);
        let prob = raw.clamp(0.0, 1.0);
        if prob != raw {
            self.clamped_probabilities += 1;
            log::debug!("Hit probability {raw:.4} clamped to {prob}");
        }
        prob
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mode(&self) -> HitMode {
        self.mode
    }

    pub fn clamped_probabilities(&self) -> u64 {
        self.clamped_probabilities
    }
}
