//! Running session tally
//!
//! Score totals and outcome counts shown to the participant or summarized at
//! the end of a session.

use serde::{Deserialize, Serialize};

use crate::engine::hit::{HitClass, HitOutcome};
use crate::engine::scorer::{Attribution, ScoreResult};

/// Attempts by geometric truth versus reported result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub true_hit: u32,
    pub fake_miss: u32,
    pub fake_hit: u32,
    pub true_miss: u32,
}

impl ClassCounts {
    pub fn get(&self, class: HitClass) -> u32 {
        match class {
            HitClass::TrueHit => self.true_hit,
            HitClass::FakeMiss => self.fake_miss,
            HitClass::FakeHit => self.fake_hit,
            HitClass::TrueMiss => self.true_miss,
        }
    }

    /// Every class with its count, in [`HitClass::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (HitClass, u32)> + '_ {
        HitClass::ALL.into_iter().map(|class| (class, self.get(class)))
    }

    fn bump(&mut self, class: HitClass) {
        match class {
            HitClass::TrueHit => self.true_hit += 1,
            HitClass::FakeMiss => self.fake_miss += 1,
            HitClass::FakeHit => self.fake_hit += 1,
            HitClass::TrueMiss => self.true_miss += 1,
        }
    }
}

/// Score and outcome counters for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTally {
    /// Sum of all rewards
    pub score: f64,
    /// Most recent reward
    pub last_score: f64,
    /// Reported hits
    pub hits: u32,
    /// Attempts not reported as hits
    pub misses: u32,
    pub classes: ClassCounts,
    pub skill_rewards: u32,
    pub luck_rewards: u32,
    pub ratings: u32,
}

impl SessionTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, outcome: &HitOutcome) {
        self.classes.bump(outcome.class());
        if outcome.reported_hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    /// Add a reward; returns the new total
    pub fn record_score(&mut self, result: &ScoreResult) -> f64 {
        self.last_score = result.reward;
        self.score += result.reward;
        match result.attribution {
            Attribution::Skill => self.skill_rewards += 1,
            Attribution::Luck => self.luck_rewards += 1,
        }
        self.score
    }

    pub fn record_rating(&mut self) {
        self.ratings += 1;
    }

    /// Start counting from zero again
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn attempts(&self) -> u32 {
        self.hits + self.misses
    }

    /// Share of attempts reported as hits (0 before any attempt)
    pub fn hit_rate(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            n => f64::from(self.hits) / f64::from(n),
        }
    }
}
