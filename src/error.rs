//! Error types
//!
//! Configuration problems are experimenter mistakes and are reported at
//! construction. Session errors are inputs that arrive in the wrong state.

use thiserror::Error;

use crate::engine::SessionPhase;

/// Errors raised when an experiment configuration violates its invariants.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be greater than {min} (got {value})")]
    NotAbove {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{low_field} ({low}) exceeds {high_field} ({high})")]
    InvertedBounds {
        low_field: &'static str,
        high_field: &'static str,
        low: f64,
        high: f64,
    },
    #[error("stage boundaries must be strictly increasing ({prev} then {next} at index {index})")]
    NonMonotonicBoundaries { index: usize, prev: u32, next: u32 },
    #[error("stage schedule is empty")]
    EmptySchedule,
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
    #[error("margin drift can go negative; enable always_positive or clip at zero or above")]
    UnboundedMargin,
    #[error("unknown {kind} name '{name}'")]
    UnknownName { kind: &'static str, name: String },
    #[error("malformed configuration record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("configuration file error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

/// Invalid sampling parameters.
#[derive(Debug, Error, PartialEq)]
pub enum DistributionError {
    #[error("standard deviation must be finite and non-negative (got {0})")]
    BadDeviation(f64),
    #[error("mean must be finite (got {0})")]
    BadMean(f64),
    #[error("truncation window is empty: low {low} > high {high}")]
    EmptyWindow { low: f64, high: f64 },
}

/// Errors raised by the session sequencer for out-of-place input.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("attempt rejected while {0:?}")]
    Blocked(SessionPhase),
    #[error("rating {value} outside {min}..={max}")]
    InvalidRating { value: u8, min: u8, max: u8 },
    #[error("grid rating ({x}, {y}) outside the unit square")]
    InvalidGridPoint { x: f32, y: f32 },
    #[error("{input} does not resolve the current phase {phase:?}")]
    UnexpectedInput {
        input: &'static str,
        phase: SessionPhase,
    },
    #[error("session has ended")]
    Ended,
}
