//! Session interaction sequencer
//!
//! Drives one participant session around each attempt: drift the margin,
//! check the hit, score it, then decide whether the game must pause for a
//! rating, a stage boundary or the end of the demo. Pauses are phases the
//! caller polls, never blocking calls.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::drift::DriftProcess;
use super::hit::{HitChecker, HitOutcome};
use super::scorer::{ScoreResult, Scorer};
use super::state::{
    BoundaryKind, FlipCheck, SessionPhase, SessionStage, SkillLuckState, StageId,
};
use crate::config::SessionConfig;
use crate::consts::{
    DEFAULT_TARGET_INTERVAL, MIN_TARGET_INTERVAL, RATING_MAX, RATING_MIN, STAGE_INTERVAL_STEP,
};
use crate::error::{ConfigError, SessionError};
use crate::events::{EndReason, EventSink, PauseReason, RatioChange, SessionEvent};
use crate::tally::SessionTally;

/// A pause the caller must honor before the next attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRequest {
    pub reason: PauseReason,
    pub stage: StageId,
}

/// Everything one attempt produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptReport {
    pub outcome: HitOutcome,
    /// Margin used for this attempt
    pub margin: f64,
    pub score: Option<ScoreResult>,
    /// Pause now in force, if any
    pub pause: Option<PauseRequest>,
    pub phase: SessionPhase,
}

/// Result of resolving a pause
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resume {
    pub phase: SessionPhase,
    /// A queued pause that took over, if any
    pub pause: Option<PauseRequest>,
}

/// Counts of numeric inputs pushed back into range during a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub clamped_probabilities: u64,
    pub clamped_ratios: u64,
}

/// One participant session
#[derive(Debug)]
pub struct Session<R: Rng, S: EventSink> {
    rng: R,
    sink: S,
    hit_checker: HitChecker,
    scorer: Scorer,
    margin: DriftProcess,
    skill_luck: SkillLuckState,
    stage: SessionStage,
    phase: SessionPhase,
    /// Phases queued behind the pause in force, oldest first
    pending: VecDeque<SessionPhase>,
    feedback_limit: u32,
    feedback_count: u32,
    stage_time_change: bool,
    tally: SessionTally,
    /// Every attempt, active target or not
    attempts: u32,
}

impl<S: EventSink> Session<Pcg32, S> {
    /// Session driven by a PCG generator seeded with `seed`
    pub fn from_seed(config: &SessionConfig, seed: u64, sink: S) -> Result<Self, ConfigError> {
        log::info!("Session seed: {seed}");
        Self::new(config, Pcg32::seed_from_u64(seed), sink)
    }
}

impl<R: Rng, S: EventSink> Session<R, S> {
    pub fn new(config: &SessionConfig, rng: R, mut sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let game = &config.main_game;
        let hit_checker = HitChecker::new(game.mole_radius, &config.hit_checker)?;
        let scorer = Scorer::new(game.mole_radius, &config.scorer)?;
        let margin = DriftProcess::new(game.margin_start, config.margin_drifter.clone())?;
        let skill_luck = SkillLuckState::new(&config.skill_luck)?;
        let stage = SessionStage::new(config.stage_boundaries()?, game.demo)?;

        log::info!(
            "Session '{}' starting: {} boundaries, hit mode {}, drift {}",
            config.conditions_meta.cond_set_name,
            stage.boundaries().len(),
            hit_checker.mode().as_str(),
            margin.kind()
        );
        sink.record(&SessionEvent::SessionStart {
            condition: config.conditions_meta.cond_set_name.clone(),
            skill_ratio: skill_luck.ratio,
            margin: margin.current(),
            boundaries: stage.boundaries().to_vec(),
        });

        Ok(Self {
            rng,
            sink,
            hit_checker,
            scorer,
            margin,
            skill_luck,
            stage,
            phase: SessionPhase::Playing,
            pending: VecDeque::new(),
            feedback_limit: game.feedback_limit,
            feedback_count: 0,
            stage_time_change: game.stage_time_change,
            tally: SessionTally::new(),
            attempts: 0,
        })
    }

    /// A target popped up at `center`
    pub fn on_target_up(&mut self, center: Vec2) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        self.sink.record(&SessionEvent::MoleUp {
            x: center.x,
            y: center.y,
        });
        Ok(())
    }

    /// Evaluate a click `distance` away from the current target's center
    ///
    /// `attempt_active` is false when no target was eligible to be hit.
    pub fn on_attempt(
        &mut self,
        attempt_active: bool,
        distance: f64,
    ) -> Result<AttemptReport, SessionError> {
        match self.phase {
            SessionPhase::Playing => {}
            SessionPhase::SessionEnded => return Err(SessionError::Ended),
            phase => return Err(SessionError::Blocked(phase)),
        }

        self.attempts += 1;
        let margin = self.margin.advance(&mut self.rng);
        let outcome = self
            .hit_checker
            .check(&mut self.rng, attempt_active, distance, margin);
        self.tally.record_outcome(&outcome);
        self.sink.record(&SessionEvent::HitResult {
            attempt: self.attempts,
            class: outcome.class(),
            true_hit: outcome.true_hit,
            margin_hit: outcome.margin_hit,
            reported_hit: outcome.reported_hit,
            distance,
            margin,
        });
        log::debug!(
            "Attempt {}: distance {distance:.2}, margin {margin:.2}, {:?}",
            self.attempts,
            outcome.class()
        );

        let score = if outcome.reported_hit {
            Some(self.after_hit(distance, margin))
        } else {
            None
        };

        if attempt_active && self.stage.record_attempt() {
            self.on_stage_boundary_crossed()?;
        }

        Ok(AttemptReport {
            outcome,
            margin,
            score,
            pause: self.pause_request(),
            phase: self.phase,
        })
    }

    /// Score a reported hit, then run the feedback and flip bookkeeping
    fn after_hit(&mut self, distance: f64, margin: f64) -> ScoreResult {
        let ratio = self.skill_luck.ratio;
        let result = self.scorer.score(&mut self.rng, distance, margin, ratio);
        let total = self.tally.record_score(&result);
        self.sink.record(&SessionEvent::Score {
            reward: result.reward,
            total,
            attribution: result.attribution,
            skill_ratio: ratio,
        });

        self.feedback_count += 1;
        if self.feedback_limit > 0 && self.feedback_count >= self.feedback_limit {
            self.feedback_count = 0;
            self.enter(SessionPhase::AwaitingRating);
        }

        if let FlipCheck::Drawn { flipped, ratio } = self.skill_luck.record_hit(&mut self.rng) {
            self.sink.record(&SessionEvent::SkillCheck {
                skill_ratio: ratio,
                flip_counter: self.skill_luck.flip_counter,
            });
            if flipped {
                log::debug!("Skill/luck ratio flipped to {ratio}");
                self.sink.record(&SessionEvent::SkillChange {
                    skill_ratio: ratio,
                    cause: RatioChange::Flip,
                });
            }
        }
        result
    }

    /// Close the current stage and request the matching pause
    ///
    /// Called automatically when an attempt reaches a boundary; the caller
    /// may also force it (for example on a time-based stage end). Each
    /// crossing gets its own pause, queued behind any pause already in force.
    pub fn on_stage_boundary_crossed(&mut self) -> Result<PauseRequest, SessionError> {
        self.ensure_not_ended()?;
        if self.pending.contains(&SessionPhase::SessionEnded) {
            return Err(SessionError::Ended);
        }
        let kind = self.stage.cross();
        let reason = match kind {
            BoundaryKind::DemoEnd => {
                let ratio = self.skill_luck.redraw(&mut self.rng);
                log::info!(
                    "Demo complete (score {}), skill ratio drawn: {ratio}",
                    self.tally.score
                );
                // Demo attempts are practice
                self.tally.reset();
                self.sink.record(&SessionEvent::SkillChange {
                    skill_ratio: ratio,
                    cause: RatioChange::DemoRedraw,
                });
                self.enter(SessionPhase::DemoComplete);
                PauseReason::Demo
            }
            BoundaryKind::StageEnd => {
                log::info!("Stage complete at attempt {}", self.stage.mole_count);
                self.enter(SessionPhase::StageComplete);
                PauseReason::Stage
            }
            BoundaryKind::Final => {
                self.enter(SessionPhase::SessionEnded);
                PauseReason::End
            }
        };
        Ok(PauseRequest {
            reason,
            stage: self.stage.stage,
        })
    }

    /// A rating on the 1..=7 scale
    pub fn on_rating_input(&mut self, value: u8) -> Result<Resume, SessionError> {
        self.expect_phase(SessionPhase::AwaitingRating, "rating")?;
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(SessionError::InvalidRating {
                value,
                min: RATING_MIN,
                max: RATING_MAX,
            });
        }
        self.tally.record_rating();
        self.sink.record(&SessionEvent::Rate { value });
        Ok(self.resume())
    }

    /// A rating placed on the 2x2 skill/luck grid, in unit-square coordinates
    pub fn on_grid_rating(&mut self, point: Vec2) -> Result<Resume, SessionError> {
        self.expect_phase(SessionPhase::AwaitingRating, "grid rating")?;
        let inside = (0.0..=1.0).contains(&point.x) && (0.0..=1.0).contains(&point.y);
        if !inside {
            return Err(SessionError::InvalidGridPoint {
                x: point.x,
                y: point.y,
            });
        }
        self.tally.record_rating();
        self.sink.record(&SessionEvent::GridRate {
            x: point.x,
            y: point.y,
        });
        Ok(self.resume())
    }

    /// Continue past a stage or demo pause
    pub fn on_continue(&mut self) -> Result<Resume, SessionError> {
        match self.phase {
            SessionPhase::StageComplete | SessionPhase::DemoComplete => Ok(self.resume()),
            SessionPhase::SessionEnded => Err(SessionError::Ended),
            phase => Err(SessionError::UnexpectedInput {
                input: "continue",
                phase,
            }),
        }
    }

    /// End the session at the participant's request
    pub fn on_quit(&mut self) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        self.pending.clear();
        self.phase = SessionPhase::SessionEnded;
        self.finish(EndReason::Quit);
        Ok(())
    }

    /// Pop-up interval for the current stage
    ///
    /// Without stage pacing the interval is fixed at
    /// [`DEFAULT_TARGET_INTERVAL`]. A schedule that runs out of time falls
    /// back to [`MIN_TARGET_INTERVAL`].
    pub fn target_interval(&self, initial: f64) -> f64 {
        if !self.stage_time_change {
            return DEFAULT_TARGET_INTERVAL;
        }
        let interval = initial - STAGE_INTERVAL_STEP * f64::from(self.stage.stage.pace_index());
        if interval > 0.0 {
            interval
        } else {
            MIN_TARGET_INTERVAL
        }
    }

    pub fn moles_left(&self) -> u32 {
        self.stage.moles_left()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn pause_request(&self) -> Option<PauseRequest> {
        let reason = match self.phase {
            SessionPhase::AwaitingRating => PauseReason::Rating,
            SessionPhase::StageComplete => PauseReason::Stage,
            SessionPhase::DemoComplete => PauseReason::Demo,
            SessionPhase::Playing | SessionPhase::SessionEnded => return None,
        };
        Some(PauseRequest {
            reason,
            stage: self.stage.stage,
        })
    }

    pub fn stage(&self) -> &SessionStage {
        &self.stage
    }

    pub fn skill_luck(&self) -> &SkillLuckState {
        &self.skill_luck
    }

    pub fn margin(&self) -> &DriftProcess {
        &self.margin
    }

    pub fn tally(&self) -> &SessionTally {
        &self.tally
    }

    pub fn hit_checker(&self) -> &HitChecker {
        &self.hit_checker
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            clamped_probabilities: self.hit_checker.clamped_probabilities(),
            clamped_ratios: self.scorer.clamped_ratios(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Move to `next`, or queue it if a pause is already in force
    fn enter(&mut self, next: SessionPhase) {
        if self.phase != SessionPhase::Playing {
            self.pending.push_back(next);
            return;
        }
        self.phase = next;
        self.announce();
    }

    /// Resolve the current pause, promoting any queued phase
    fn resume(&mut self) -> Resume {
        let from = self.phase;
        self.phase = self.pending.pop_front().unwrap_or(SessionPhase::Playing);
        self.sink.record(&SessionEvent::Resume {
            from,
            to: self.phase,
        });
        self.announce();
        Resume {
            phase: self.phase,
            pause: self.pause_request(),
        }
    }

    /// Emit the event for entering the current phase
    fn announce(&mut self) {
        if self.phase == SessionPhase::SessionEnded {
            self.finish(EndReason::Completed);
        } else if let Some(pause) = self.pause_request() {
            self.sink.record(&SessionEvent::Pause {
                reason: pause.reason,
                stage: pause.stage,
            });
        }
    }

    fn finish(&mut self, reason: EndReason) {
        log::info!(
            "Session ended ({reason:?}): score {}, {} hits, {} misses",
            self.tally.score,
            self.tally.hits,
            self.tally.misses
        );
        self.sink.record(&SessionEvent::End {
            reason,
            total: self.tally.score,
        });
    }

    fn expect_phase(&self, phase: SessionPhase, input: &'static str) -> Result<(), SessionError> {
        if self.phase == phase {
            return Ok(());
        }
        self.ensure_not_ended()?;
        Err(SessionError::UnexpectedInput {
            input,
            phase: self.phase,
        })
    }

    fn ensure_not_ended(&self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::SessionEnded {
            Err(SessionError::Ended)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;

    /// Deterministic hits, no drift, stages of 3 after a demo of 2
    fn config() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.main_game.mole_radius = 10.0;
        config.main_game.margin_start = 0.0;
        config.main_game.demo = true;
        config.main_game.demo_len = 2;
        config.main_game.stage_length = 3;
        config.main_game.stages = 2;
        config.main_game.feedback_limit = 0;
        config
    }

    fn session(config: &SessionConfig) -> Session<Pcg32, MemorySink> {
        Session::from_seed(config, 42, MemorySink::new()).unwrap()
    }

    #[test]
    fn test_attempt_scores_reported_hit() {
        let mut s = session(&config());
        let report = s.on_attempt(true, 0.0).unwrap();
        assert_eq!(report.outcome.as_tuple(), (true, true, true));
        // Initial ratio is 1.0: always skill, dead center is max
        assert_eq!(report.score.unwrap().reward, 10.0);
        assert_eq!(s.tally().score, 10.0);
        assert_eq!(s.sink().count("hit_result"), 1);
        assert_eq!(s.sink().count("score"), 1);
    }

    #[test]
    fn test_miss_is_not_scored() {
        let mut s = session(&config());
        let report = s.on_attempt(true, 25.0).unwrap();
        assert!(report.score.is_none());
        assert_eq!(s.tally().misses, 1);
        assert_eq!(s.sink().count("score"), 0);
        assert_eq!(s.diagnostics(), Diagnostics::default());
    }

    #[test]
    fn test_demo_end_redraws_ratio_and_pauses() {
        let mut s = session(&config());
        s.on_attempt(true, 0.0).unwrap();
        let report = s.on_attempt(true, 0.0).unwrap();
        assert_eq!(report.phase, SessionPhase::DemoComplete);
        assert_eq!(report.pause.unwrap().reason, PauseReason::Demo);
        let ratio = s.skill_luck().ratio;
        assert!(ratio == 0.8 || (ratio - 0.2).abs() < 1e-12);
        assert_eq!(s.skill_luck().flip_counter, 0);
        assert_eq!(
            s.on_attempt(true, 0.0),
            Err(SessionError::Blocked(SessionPhase::DemoComplete))
        );
        assert_eq!(s.on_continue().unwrap().phase, SessionPhase::Playing);
        assert_eq!(s.stage().stage, StageId::Stage(1));
    }

    #[test]
    fn test_full_session_reaches_end() {
        let mut s = session(&config());
        let mut pauses = Vec::new();
        while s.phase() != SessionPhase::SessionEnded {
            let report = s.on_attempt(true, 1.0).unwrap();
            if let Some(pause) = report.pause {
                pauses.push(pause.reason);
                s.on_continue().unwrap();
            }
        }
        // Boundaries 2, 5, 8
        assert_eq!(pauses, vec![PauseReason::Demo, PauseReason::Stage]);
        assert_eq!(s.stage().mole_count, 8);
        assert_eq!(s.sink().count("end"), 1);
        assert_eq!(s.on_attempt(true, 0.0), Err(SessionError::Ended));
    }

    #[test]
    fn test_inactive_attempts_do_not_advance_stage() {
        let mut s = session(&config());
        for _ in 0..5 {
            s.on_attempt(false, 0.0).unwrap();
        }
        assert_eq!(s.stage().mole_count, 0);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.tally().misses, 5);
    }

    #[test]
    fn test_rating_cadence() {
        let mut cfg = config();
        cfg.main_game.feedback_limit = 2;
        cfg.main_game.demo = false;
        cfg.main_game.stage_length = 100;
        let mut s = session(&cfg);
        assert!(s.on_attempt(true, 0.0).unwrap().pause.is_none());
        let report = s.on_attempt(true, 0.0).unwrap();
        assert_eq!(report.phase, SessionPhase::AwaitingRating);

        assert_eq!(
            s.on_continue(),
            Err(SessionError::UnexpectedInput {
                input: "continue",
                phase: SessionPhase::AwaitingRating
            })
        );
        assert!(matches!(
            s.on_rating_input(9),
            Err(SessionError::InvalidRating { value: 9, .. })
        ));
        let resume = s.on_rating_input(5).unwrap();
        assert_eq!(resume.phase, SessionPhase::Playing);
        assert_eq!(s.tally().ratings, 1);
        assert_eq!(s.sink().count("rate"), 1);
    }

    #[test]
    fn test_rating_comes_before_stage_pause() {
        let mut cfg = config();
        cfg.main_game.feedback_limit = 2;
        let mut s = session(&cfg);
        s.on_attempt(true, 0.0).unwrap();
        // Second hit is due for a rating and closes the demo
        let report = s.on_attempt(true, 0.0).unwrap();
        assert_eq!(report.pause.unwrap().reason, PauseReason::Rating);

        let resume = s.on_grid_rating(Vec2::new(0.25, 0.75)).unwrap();
        assert_eq!(resume.phase, SessionPhase::DemoComplete);
        assert_eq!(resume.pause.unwrap().reason, PauseReason::Demo);
        assert_eq!(s.on_continue().unwrap().phase, SessionPhase::Playing);
    }

    #[test]
    fn test_grid_rating_outside_square_rejected() {
        let mut cfg = config();
        cfg.main_game.feedback_limit = 1;
        let mut s = session(&cfg);
        s.on_attempt(true, 0.0).unwrap();
        assert!(matches!(
            s.on_grid_rating(Vec2::new(1.5, 0.5)),
            Err(SessionError::InvalidGridPoint { .. })
        ));
        assert_eq!(s.phase(), SessionPhase::AwaitingRating);
    }

    #[test]
    fn test_quit_ends_from_any_pause() {
        let mut cfg = config();
        cfg.main_game.feedback_limit = 1;
        let mut s = session(&cfg);
        s.on_attempt(true, 0.0).unwrap();
        assert_eq!(s.phase(), SessionPhase::AwaitingRating);
        s.on_quit().unwrap();
        assert_eq!(s.phase(), SessionPhase::SessionEnded);
        assert_eq!(s.on_quit(), Err(SessionError::Ended));
        assert_eq!(s.on_rating_input(3), Err(SessionError::Ended));
        let ends: Vec<_> = s.sink().named("end").collect();
        assert_eq!(
            ends,
            vec![&SessionEvent::End {
                reason: EndReason::Quit,
                total: 10.0
            }]
        );
    }

    #[test]
    fn test_demo_score_is_practice() {
        let mut s = session(&config());
        s.on_attempt(true, 0.0).unwrap();
        s.on_attempt(true, 0.0).unwrap();
        assert_eq!(s.phase(), SessionPhase::DemoComplete);
        assert_eq!(s.tally().score, 0.0);
        assert_eq!(s.tally().attempts(), 0);

        s.on_continue().unwrap();
        let report = s.on_attempt(true, 0.0).unwrap();
        let reward = report.score.unwrap().reward;
        assert_eq!(s.tally().score, reward);
        assert_eq!(s.tally().hits, 1);
        // Stage progress still counts the demo
        assert_eq!(s.stage().mole_count, 3);
    }

    #[test]
    fn test_forced_crossing_behind_rating_keeps_both_pauses() {
        let mut cfg = config();
        cfg.main_game.demo = false;
        cfg.main_game.stage_boundaries = Some(vec![2, 4, 6, 8]);
        cfg.main_game.feedback_limit = 2;
        let mut s = session(&cfg);
        s.on_attempt(true, 0.0).unwrap();
        let report = s.on_attempt(true, 0.0).unwrap();
        assert_eq!(report.pause.unwrap().reason, PauseReason::Rating);

        let forced = s.on_stage_boundary_crossed().unwrap();
        assert_eq!(forced.stage, StageId::Stage(3));
        assert_eq!(s.phase(), SessionPhase::AwaitingRating);

        let resume = s.on_rating_input(4).unwrap();
        assert_eq!(resume.phase, SessionPhase::StageComplete);
        assert_eq!(s.on_continue().unwrap().phase, SessionPhase::StageComplete);
        assert_eq!(s.on_continue().unwrap().phase, SessionPhase::Playing);
        // One rating pause, one pause per crossing
        assert_eq!(s.sink().count("pause"), 3);
    }

    #[test]
    fn test_crossing_after_end_is_rejected() {
        let mut s = session(&config());
        s.on_quit().unwrap();
        assert_eq!(s.on_stage_boundary_crossed(), Err(SessionError::Ended));

        let mut cfg = config();
        cfg.main_game.demo = false;
        cfg.main_game.stage_boundaries = Some(vec![2]);
        cfg.main_game.feedback_limit = 2;
        let mut s = session(&cfg);
        s.on_attempt(true, 0.0).unwrap();
        s.on_attempt(true, 0.0).unwrap();
        // Final boundary is queued behind the rating
        assert_eq!(s.phase(), SessionPhase::AwaitingRating);
        assert_eq!(s.on_stage_boundary_crossed(), Err(SessionError::Ended));
        assert_eq!(s.on_rating_input(2).unwrap().phase, SessionPhase::SessionEnded);
        assert_eq!(s.sink().count("end"), 1);
    }

    #[test]
    fn test_forced_boundary_crossing() {
        let mut cfg = config();
        cfg.main_game.demo = false;
        let mut s = session(&cfg);
        let pause = s.on_stage_boundary_crossed().unwrap();
        assert_eq!(pause.reason, PauseReason::Stage);
        assert_eq!(pause.stage, StageId::Stage(2));
        assert_eq!(s.phase(), SessionPhase::StageComplete);
    }

    #[test]
    fn test_target_interval_shrinks_by_stage() {
        let mut cfg = config();
        cfg.main_game.stage_time_change = true;
        let s = session(&cfg);
        assert!((s.target_interval(1.0) - 0.85).abs() < 1e-12);
        assert!((s.target_interval(0.2) - 0.05).abs() < 1e-12);
        assert_eq!(s.target_interval(0.15), MIN_TARGET_INTERVAL);
        assert_eq!(s.target_interval(0.1), MIN_TARGET_INTERVAL);

        let plain = session(&config());
        assert_eq!(plain.target_interval(0.6), DEFAULT_TARGET_INTERVAL);
    }

    #[test]
    fn test_moles_left_counts_down() {
        let mut s = session(&config());
        assert_eq!(s.moles_left(), 2);
        s.on_attempt(true, 0.0).unwrap();
        assert_eq!(s.moles_left(), 1);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut cfg = config();
        cfg.hit_checker.hit_type = crate::engine::hit::HitMode::Binomial;
        cfg.skill_luck.initial_ratio = 0.5;
        let mut a = session(&cfg);
        let mut b = session(&cfg);
        for i in 0..6 {
            let d = f64::from(i) * 1.5;
            let ra = a.on_attempt(true, d).unwrap();
            let rb = b.on_attempt(true, d).unwrap();
            assert_eq!(ra, rb);
            if ra.pause.is_some() {
                a.on_continue().unwrap();
                b.on_continue().unwrap();
            }
        }
        assert_eq!(a.sink().events, b.sink().events);
    }
}
