use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use wam_engine::engine::{
    DriftConfig, DriftKind, DriftProcess, FlipCheck, HitChecker, HitCheckerConfig, HitMode,
    LuckMode, Scorer, ScorerConfig, SkillLuckConfig, SkillLuckState, SkillMode,
    sample_truncated_normal,
};
use wam_engine::events::{MemorySink, RatioChange, SessionEvent};
use wam_engine::{Session, SessionConfig, SessionPhase};

fn drift_kind() -> impl Strategy<Value = DriftKind> {
    prop_oneof![
        Just(DriftKind::Static),
        Just(DriftKind::Sinusoidal),
        Just(DriftKind::Linear),
        Just(DriftKind::LinearSinusoidal),
        Just(DriftKind::Random),
    ]
}

fn scorer_config(skill_type: SkillMode, rand_type: LuckMode) -> ScorerConfig {
    ScorerConfig {
        min_score: 0.0,
        max_score: 10.0,
        skill_type,
        rand_type,
        rand_mean: 5.0,
        rand_sd: 2.0,
        decimals: 0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn clipped_drift_stays_in_bounds(
        kind in drift_kind(),
        seed in any::<u64>(),
        initial in 0.0f64..20.0,
        gradient in -3.0f64..3.0,
        amplitude in 0.0f64..15.0,
        low in 0.0f64..5.0,
        width in 0.0f64..10.0,
        noise in any::<bool>(),
    ) {
        let config = DriftConfig {
            drift_type: kind,
            gradient,
            amplitude,
            noise,
            noise_truncated: false,
            drift_clip: true,
            clip_low_bnd: low,
            clip_high_bnd: low + width,
            ..DriftConfig::default()
        };
        let mut process = DriftProcess::new(initial, config).unwrap();
        let mut rng = Pcg32::seed_from_u64(seed);
        for _ in 0..50 {
            let value = process.advance(&mut rng);
            if kind == DriftKind::Static {
                prop_assert_eq!(value, initial);
            } else {
                prop_assert!(value >= low && value <= low + width, "{} outside clip", value);
            }
        }
    }

    #[test]
    fn drift_replays_for_same_seed(kind in drift_kind(), seed in any::<u64>()) {
        let config = DriftConfig {
            drift_type: kind,
            noise: true,
            ..DriftConfig::default()
        };
        let mut a = DriftProcess::new(10.0, config.clone()).unwrap();
        let mut b = DriftProcess::new(10.0, config).unwrap();
        let mut rng_a = Pcg32::seed_from_u64(seed);
        let mut rng_b = Pcg32::seed_from_u64(seed);
        for _ in 0..30 {
            prop_assert_eq!(a.advance(&mut rng_a), b.advance(&mut rng_b));
        }
    }

    #[test]
    fn scores_stay_within_bounds(
        seed in any::<u64>(),
        distance in 0.0f64..60.0,
        margin in 0.0f64..20.0,
        ratio in 0.0f64..=1.0,
        non_linear in any::<bool>(),
        normal_luck in any::<bool>(),
    ) {
        let skill = if non_linear { SkillMode::NonLinear } else { SkillMode::Linear };
        let luck = if normal_luck { LuckMode::Normal } else { LuckMode::Uniform };
        let mut scorer = Scorer::new(40.0, &scorer_config(skill, luck)).unwrap();
        let mut rng = Pcg32::seed_from_u64(seed);
        let result = scorer.score(&mut rng, distance, margin, ratio);
        prop_assert!((0.0..=10.0).contains(&result.reward));
        prop_assert_eq!(result.reward, result.reward.round());
    }

    #[test]
    fn skill_only_scoring_never_rewards_distance(
        seed in any::<u64>(),
        near in 0.0f64..50.0,
        extra in 0.0f64..50.0,
        margin in 0.0f64..20.0,
        non_linear in any::<bool>(),
    ) {
        let skill = if non_linear { SkillMode::NonLinear } else { SkillMode::Linear };
        let config = ScorerConfig { decimals: 3, ..scorer_config(skill, LuckMode::Uniform) };
        let mut scorer = Scorer::new(40.0, &config).unwrap();
        let mut rng = Pcg32::seed_from_u64(seed);
        let close = scorer.score(&mut rng, near, margin, 1.0).reward;
        let far = scorer.score(&mut rng, near + extra, margin, 1.0).reward;
        prop_assert!(close >= far, "{} < {}", close, far);
    }

    #[test]
    fn standard_reports_exactly_margin_hits(
        seed in any::<u64>(),
        distance in 0.0f64..80.0,
        margin in 0.0f64..30.0,
    ) {
        let mut checker = HitChecker::new(40.0, &HitCheckerConfig::default()).unwrap();
        let mut rng = Pcg32::seed_from_u64(seed);
        let outcome = checker.check(&mut rng, true, distance, margin);
        prop_assert_eq!(outcome.reported_hit, outcome.margin_hit);
        prop_assert!(!outcome.true_hit || outcome.margin_hit);
    }

    #[test]
    fn binomial_never_reports_outside_margin(
        seed in any::<u64>(),
        distance in 0.0f64..80.0,
        margin in 0.0f64..30.0,
    ) {
        let config = HitCheckerConfig {
            hit_type: HitMode::Binomial,
            ..HitCheckerConfig::default()
        };
        let mut checker = HitChecker::new(40.0, &config).unwrap();
        let mut rng = Pcg32::seed_from_u64(seed);
        let outcome = checker.check(&mut rng, true, distance, margin);
        prop_assert!(!outcome.reported_hit || outcome.margin_hit);
        prop_assert_eq!(outcome.margin_hit, distance < 40.0 + margin);
    }

    #[test]
    fn truncated_samples_stay_in_window(
        seed in any::<u64>(),
        mean in -20.0f64..20.0,
        sd in 0.0f64..10.0,
        low in -30.0f64..30.0,
        width in 0.0f64..20.0,
    ) {
        let mut rng = Pcg32::seed_from_u64(seed);
        for _ in 0..20 {
            let x = sample_truncated_normal(&mut rng, mean, sd, low, low + width);
            prop_assert!(x >= low && x <= low + width, "{} outside [{}, {}]", x, low, low + width);
        }
    }

    #[test]
    fn session_events_agree_with_tally(seed in any::<u64>(), spread in 0.0f64..30.0) {
        let mut config = SessionConfig::default();
        config.main_game.demo_len = 3;
        config.main_game.stage_length = 5;
        config.main_game.stages = 2;
        config.main_game.feedback_limit = 3;
        config.hit_checker.hit_type = HitMode::Binomial;
        let mut session = Session::from_seed(&config, seed, MemorySink::new()).unwrap();

        let mut attempt = 0u32;
        while session.phase() != SessionPhase::SessionEnded {
            match session.phase() {
                SessionPhase::AwaitingRating => {
                    session.on_rating_input(4).unwrap();
                }
                SessionPhase::StageComplete | SessionPhase::DemoComplete => {
                    session.on_continue().unwrap();
                }
                _ => {
                    let distance = spread * f64::from(attempt % 7) / 6.0 + 30.0;
                    session.on_attempt(true, distance).unwrap();
                    attempt += 1;
                }
            }
        }

        let tally = session.tally().clone();
        prop_assert_eq!(attempt, 13);
        prop_assert_eq!(session.stage().mole_count, 13);
        let sink = session.into_sink();
        let mut total = 0.0;
        let mut reported = 0;
        for event in &sink.events {
            match event {
                SessionEvent::Score { reward, .. } => total += reward,
                SessionEvent::HitResult { reported_hit, margin_hit, .. } => {
                    prop_assert!(!reported_hit || *margin_hit);
                    reported += u32::from(*reported_hit);
                }
                // Demo attempts are not part of the tally
                SessionEvent::SkillChange { cause: RatioChange::DemoRedraw, .. } => {
                    total = 0.0;
                    reported = 0;
                }
                _ => {}
            }
        }
        prop_assert_eq!(reported, tally.hits);
        prop_assert!((total - tally.score).abs() < 1e-9);
        prop_assert_eq!(sink.count("end"), 1);
    }
}

#[test]
fn flip_rate_is_near_configured_probability() {
    let mut state = SkillLuckState::new(&SkillLuckConfig::default()).unwrap();
    let mut rng = Pcg32::seed_from_u64(2024);
    let (mut draws, mut flips) = (0u32, 0u32);
    for _ in 0..50_000 {
        if let FlipCheck::Drawn { flipped, .. } = state.record_hit(&mut rng) {
            draws += 1;
            flips += u32::from(flipped);
        }
    }
    let rate = f64::from(flips) / f64::from(draws);
    assert!((rate - 0.2).abs() < 0.02, "flip rate {rate}");
}

#[test]
fn flip_alternates_between_master_and_complement() {
    let mut state = SkillLuckState::new(&SkillLuckConfig::default()).unwrap();
    let mut rng = Pcg32::seed_from_u64(7);
    let mut seen = Vec::new();
    for _ in 0..2_000 {
        if let FlipCheck::Drawn { flipped: true, ratio } = state.record_hit(&mut rng) {
            seen.push(ratio);
        }
    }
    assert!(seen.len() > 10);
    for ratio in seen {
        assert!((ratio - 0.8).abs() < 1e-12 || (ratio - 0.2).abs() < 1e-12, "ratio {ratio}");
    }
}

#[test]
fn binomial_hit_rate_falls_with_distance() {
    let config = HitCheckerConfig {
        hit_type: HitMode::Binomial,
        luck_sd: 0.0,
        ..HitCheckerConfig::default()
    };
    let mut checker = HitChecker::new(10.0, &config).unwrap();
    let mut rng = Pcg32::seed_from_u64(99);
    let mut rate = |distance: f64| {
        let hits = (0..20_000)
            .filter(|_| checker.check(&mut rng, true, distance, 5.0).reported_hit)
            .count();
        hits as f64 / 20_000.0
    };
    assert_eq!(rate(0.0), 1.0);
    let mid = rate(7.5);
    let edge = rate(14.99);
    assert!((mid - 1.0 / 1.5).abs() < 0.02, "mid rate {mid}");
    assert!((edge - 0.5).abs() < 0.02, "edge rate {edge}");
    assert_eq!(rate(15.0), 0.0);
}

#[test]
fn concrete_boundary_scenario() {
    let mut checker = HitChecker::new(10.0, &HitCheckerConfig::default()).unwrap();
    let mut rng = Pcg32::seed_from_u64(1);
    let cases = [
        (0.0, (true, true, true)),
        (10.0, (true, true, true)),
        (12.0, (false, true, true)),
        (15.0, (false, false, false)),
    ];
    for (distance, expected) in cases {
        let outcome = checker.check(&mut rng, true, distance, 5.0);
        assert_eq!(outcome.as_tuple(), expected, "distance {distance}");
    }
}

#[test]
fn concrete_scoring_scenario() {
    let mut scorer = Scorer::new(10.0, &scorer_config(SkillMode::Linear, LuckMode::Uniform)).unwrap();
    let mut rng = Pcg32::seed_from_u64(3);
    // precision = 1 - 6 / 15 = 0.6
    assert_eq!(scorer.score(&mut rng, 6.0, 5.0, 1.0).reward, 6.0);
    let nonlinear = ScorerConfig {
        decimals: 2,
        ..scorer_config(SkillMode::NonLinear, LuckMode::Uniform)
    };
    let mut scorer = Scorer::new(10.0, &nonlinear).unwrap();
    assert_eq!(scorer.score(&mut rng, 6.0, 5.0, 1.0).reward, 3.6);
}
