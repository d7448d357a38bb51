//! Session state types
//!
//! Stage progress and the covert skill/luck condition. Both are mutated only
//! by the session sequencer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{FLIP_PROBABILITY, FLIP_THRESHOLD, INITIAL_SKILL_RATIO, MASTER_SKILL_RATIO};
use crate::error::ConfigError;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Attempts are accepted
    Playing,
    /// Waiting for a confidence / skill-luck rating
    AwaitingRating,
    /// A stage boundary was reached; waiting for continue
    StageComplete,
    /// The warm-up demo finished; waiting for continue
    DemoComplete,
    /// Final boundary passed or participant quit
    SessionEnded,
}

impl SessionPhase {
    pub fn is_paused(&self) -> bool {
        matches!(
            self,
            SessionPhase::AwaitingRating | SessionPhase::StageComplete | SessionPhase::DemoComplete
        )
    }
}

/// Which stage the participant is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Demo,
    Stage(u32),
}

impl StageId {
    /// Stage number for pacing purposes (the demo paces like stage 1)
    pub fn pace_index(&self) -> u32 {
        match self {
            StageId::Demo => 1,
            StageId::Stage(n) => *n,
        }
    }
}

/// What kind of boundary was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    DemoEnd,
    StageEnd,
    Final,
}

/// Stage progress measured in attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStage {
    pub stage: StageId,
    /// Attempts made against an active target
    pub mole_count: u32,
    boundaries: Vec<u32>,
    /// Boundaries already crossed
    passed: usize,
    demo: bool,
}

impl SessionStage {
    /// Build from explicit thresholds. With `demo`, the first threshold ends
    /// the warm-up phase.
    pub fn new(boundaries: Vec<u32>, demo: bool) -> Result<Self, ConfigError> {
        if boundaries.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        for (index, pair) in boundaries.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::NonMonotonicBoundaries {
                    index: index + 1,
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        if boundaries[0] == 0 {
            return Err(ConfigError::ZeroCount {
                field: "stage_boundaries[0]",
            });
        }
        if demo && boundaries.len() < 2 {
            return Err(ConfigError::ZeroCount { field: "stages" });
        }
        Ok(Self {
            stage: if demo { StageId::Demo } else { StageId::Stage(1) },
            mole_count: 0,
            boundaries,
            passed: 0,
            demo,
        })
    }

    /// Thresholds for an optional demo of `demo_len` followed by `stages`
    /// stages of `stage_length` attempts each
    pub fn boundaries_from_lengths(demo_len: u32, stage_length: u32, stages: u32) -> Vec<u32> {
        let first = (demo_len > 0).then_some(demo_len);
        first
            .into_iter()
            .chain((1..=stages).map(|k| demo_len + k * stage_length))
            .collect()
    }

    pub fn boundaries(&self) -> &[u32] {
        &self.boundaries
    }

    /// The next threshold, if any remain
    pub fn next_boundary(&self) -> Option<u32> {
        self.boundaries.get(self.passed).copied()
    }

    pub fn in_demo(&self) -> bool {
        self.stage == StageId::Demo
    }

    /// Count one attempt; true when it reaches the next boundary
    pub fn record_attempt(&mut self) -> bool {
        self.mole_count += 1;
        self.next_boundary()
            .is_some_and(|boundary| self.mole_count >= boundary)
    }

    /// Close the current stage and move to the next one
    pub fn cross(&mut self) -> BoundaryKind {
        let kind = if self.demo && self.passed == 0 {
            self.stage = StageId::Stage(1);
            BoundaryKind::DemoEnd
        } else if self.passed + 1 >= self.boundaries.len() {
            BoundaryKind::Final
        } else {
            if let StageId::Stage(n) = self.stage {
                self.stage = StageId::Stage(n + 1);
            }
            BoundaryKind::StageEnd
        };
        self.passed = (self.passed + 1).min(self.boundaries.len());
        kind
    }

    /// Attempts remaining in the demo, or in the whole session after it
    pub fn moles_left(&self) -> u32 {
        let target = if self.in_demo() {
            self.boundaries[0]
        } else {
            self.boundaries[self.boundaries.len() - 1]
        };
        target.saturating_sub(self.mole_count)
    }
}

/// Covert skill/luck manipulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillLuckConfig {
    /// Ratio in force before the first flip or demo redraw
    pub initial_ratio: f64,
    /// `r` in the two-point set `{r, 1 - r}`
    pub master_ratio: f64,
    /// Reported hits before flips become possible
    pub flip_threshold: u32,
    /// Chance of a flip per reported hit past the threshold
    pub flip_probability: f64,
}

impl Default for SkillLuckConfig {
    fn default() -> Self {
        Self {
            initial_ratio: INITIAL_SKILL_RATIO,
            master_ratio: MASTER_SKILL_RATIO,
            flip_threshold: FLIP_THRESHOLD,
            flip_probability: FLIP_PROBABILITY,
        }
    }
}

impl SkillLuckConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("initial_ratio", self.initial_ratio),
            ("master_ratio", self.master_ratio),
            ("flip_probability", self.flip_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 1.0,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Result of checking for a flip after a reported hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlipCheck {
    /// Counter has not passed the threshold yet
    Waiting,
    /// A draw was made; `flipped` tells whether the ratio changed
    Drawn { flipped: bool, ratio: f64 },
}

/// Probability mass on the skill branch and the flip bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillLuckState {
    pub ratio: f64,
    pub master_ratio: f64,
    pub flip_counter: u32,
    pub flip_threshold: u32,
    pub flip_probability: f64,
}

impl SkillLuckState {
    pub fn new(config: &SkillLuckConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            ratio: config.initial_ratio,
            master_ratio: config.master_ratio,
            flip_counter: 0,
            flip_threshold: config.flip_threshold,
            flip_probability: config.flip_probability,
        })
    }

    /// Count a reported hit and maybe swap the ratio
    pub fn record_hit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FlipCheck {
        self.flip_counter += 1;
        if self.flip_counter <= self.flip_threshold {
            return FlipCheck::Waiting;
        }
        let flipped = rng.random_bool(self.flip_probability);
        if flipped {
            self.flip_counter = 0;
            self.ratio = self.swapped();
        }
        FlipCheck::Drawn {
            flipped,
            ratio: self.ratio,
        }
    }

    /// Draw a fresh ratio from `{r, 1 - r}` and restart the counter
    pub fn redraw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.ratio = if rng.random_bool(0.5) {
            self.master_ratio
        } else {
            1.0 - self.master_ratio
        };
        self.flip_counter = 0;
        self.ratio
    }

    fn swapped(&self) -> f64 {
        if self.ratio == self.master_ratio {
            1.0 - self.master_ratio
        } else {
            self.master_ratio
        }
    }
}
