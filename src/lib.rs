//! Whack-a-Mole skill/luck engine
//!
//! Core modules:
//! - `engine`: Seeded hit checking, scoring, margin drift and session sequencing
//! - `config`: Typed experiment configuration and its persisted record
//! - `events`: Structured session events and the sinks that record them
//! - `tally`: Running score and hit classification counts
//! - `error`: Configuration and session error types

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod tally;

pub use config::SessionConfig;
pub use engine::{
    Attribution, DriftKind, DriftProcess, HitChecker, HitMode, HitOutcome, ScoreResult, Scorer,
    Session, SessionPhase,
};
pub use error::{ConfigError, SessionError};
pub use events::{EventSink, SessionEvent};
pub use tally::SessionTally;

use glam::Vec2;

/// Experiment defaults
pub mod consts {
    /// True radius of a mole target (pixels)
    pub const MOLE_RADIUS: f64 = 40.0;
    /// Starting hit margin before any drift
    pub const MARGIN_START: f64 = 10.0;

    /// Probability mass on the skill branch at session start
    pub const INITIAL_SKILL_RATIO: f64 = 1.0;
    /// Skill ratio the covert manipulation swaps around (`r` and `1 - r`)
    pub const MASTER_SKILL_RATIO: f64 = 0.8;
    /// Reported hits before a skill/luck flip may occur
    pub const FLIP_THRESHOLD: u32 = 8;
    /// Chance of a flip once the threshold is passed
    pub const FLIP_PROBABILITY: f64 = 0.2;

    /// Rating scale bounds (inclusive)
    pub const RATING_MIN: u8 = 1;
    pub const RATING_MAX: u8 = 7;

    /// Pop-up interval shortening per stage (seconds)
    pub const STAGE_INTERVAL_STEP: f64 = 0.15;
    /// Pop-up interval when stage pacing is off (seconds)
    pub const DEFAULT_TARGET_INTERVAL: f64 = 1.0;
    /// Interval used once the stage schedule would reach zero (seconds)
    pub const MIN_TARGET_INTERVAL: f64 = 0.05;
}

/// Euclidean distance from the pointer to a target center
#[inline]
pub fn distance(pointer: Vec2, center: Vec2) -> f64 {
    f64::from(pointer.distance(center))
}

/// Pointer location relative to a target center
#[inline]
pub fn relative_location(pointer: Vec2, center: Vec2) -> Vec2 {
    pointer - center
}
