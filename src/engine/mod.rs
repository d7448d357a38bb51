//! Seeded skill/luck engine
//!
//! Everything that decides an attempt lives here. This module must stay
//! deterministic for a given seed:
//! - One injected RNG per session, no global randomness
//! - Pauses are phases to poll, never blocking waits
//! - No rendering, timing or platform dependencies

pub mod distributions;
pub mod drift;
pub mod hit;
pub mod scorer;
pub mod session;
pub mod state;

pub use distributions::{TruncatedNormal, sample_normal, sample_truncated_normal};
pub use drift::{DriftConfig, DriftKind, DriftProcess};
pub use hit::{HitChecker, HitCheckerConfig, HitClass, HitMode, HitOutcome};
pub use scorer::{Attribution, LuckMode, ScoreResult, Scorer, ScorerConfig, SkillMode};
pub use session::{AttemptReport, Diagnostics, PauseRequest, Resume, Session};
pub use state::{
    BoundaryKind, FlipCheck, SessionPhase, SessionStage, SkillLuckConfig, SkillLuckState, StageId,
};
