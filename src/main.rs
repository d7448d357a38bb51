//! wam-sim entry point
//!
//! Runs one full session headlessly with a synthetic participant and writes
//! the event stream as JSON lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use wam_engine::engine::{PauseRequest, sample_normal};
use wam_engine::events::{JsonLinesSink, PauseReason};
use wam_engine::{Session, SessionConfig, SessionPhase, distance};

/// Play area the synthetic targets pop up in (pixels)
const ARENA: Vec2 = Vec2::new(800.0, 600.0);
/// Chance a click lands while no target is up
const STRAY_CLICK_PROBABILITY: f64 = 0.05;
/// Chance a rating pause is answered on the grid instead of the scale
const GRID_RATING_PROBABILITY: f64 = 0.5;

struct Args {
    config: Option<String>,
    seed: u64,
    events: Option<String>,
    skill: f64,
}

fn usage() -> ! {
    eprintln!("wam-sim: run a Whack-a-Mole session with a synthetic participant");
    eprintln!("Usage: wam-sim [options]\n");
    eprintln!("Options:");
    eprintln!("  --config <path>   Session configuration (JSON); defaults if omitted");
    eprintln!("  --seed <n>        Session seed (default 0)");
    eprintln!("  --events <path>   Event log destination; stdout if omitted");
    eprintln!("  --skill <0..1>    Participant accuracy (default 0.7)");
    std::process::exit(2);
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        seed: 0,
        events: None,
        skill: 0.7,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let Some(value) = iter.next() else {
            usage();
        };
        match flag.as_str() {
            "--config" => args.config = Some(value),
            "--events" => args.events = Some(value),
            "--seed" => match value.parse() {
                Ok(seed) => args.seed = seed,
                Err(_) => usage(),
            },
            "--skill" => match value.parse::<f64>() {
                Ok(skill) if (0.0..=1.0).contains(&skill) => args.skill = skill,
                _ => usage(),
            },
            _ => usage(),
        }
    }
    args
}

/// Simulated player: aims at each target with Gaussian scatter
struct Participant {
    rng: Pcg32,
    /// Scatter of clicks around the target center (pixels)
    scatter: f64,
}

impl Participant {
    fn new(seed: u64, skill: f64, radius: f64) -> Self {
        Self {
            // Independent stream from the session's generator
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_0f_c11c),
            scatter: radius * (0.25 + 1.5 * (1.0 - skill)),
        }
    }

    fn target(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.random_range(0.0..ARENA.x),
            self.rng.random_range(0.0..ARENA.y),
        )
    }

    fn click(&mut self, center: Vec2) -> Vec2 {
        let dx = sample_normal(&mut self.rng, 0.0, self.scatter) as f32;
        let dy = sample_normal(&mut self.rng, 0.0, self.scatter) as f32;
        center + Vec2::new(dx, dy)
    }

    fn stray(&mut self) -> bool {
        self.rng.random_bool(STRAY_CLICK_PROBABILITY)
    }

    fn wants_grid(&mut self) -> bool {
        self.rng.random_bool(GRID_RATING_PROBABILITY)
    }

    fn rating(&mut self) -> u8 {
        self.rng.random_range(1..=7)
    }

    fn grid_point(&mut self) -> Vec2 {
        Vec2::new(self.rng.random(), self.rng.random())
    }
}

fn open_events(path: Option<&str>) -> std::io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    })
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let sink = JsonLinesSink::new(open_events(args.events.as_deref())?);
    let mut session = Session::from_seed(&config, args.seed, sink)?;
    let mut participant = Participant::new(args.seed, args.skill, config.main_game.mole_radius);

    while session.phase() != SessionPhase::SessionEnded {
        if let Some(pause) = session.pause_request() {
            resolve(&mut session, &mut participant, pause)?;
            continue;
        }

        if participant.stray() {
            session.on_attempt(false, 0.0)?;
            continue;
        }
        let center = participant.target();
        session.on_target_up(center)?;
        let pointer = participant.click(center);
        session.on_attempt(true, distance(pointer, center))?;
    }

    let tally = session.tally().clone();
    let diagnostics = session.diagnostics();
    let mut sink = session.into_sink();
    sink.flush()?;
    if let Some(e) = sink.take_error() {
        return Err(e.into());
    }

    log::info!(
        "Session complete: score {}, {} hits / {} attempts ({:.1}%), {} ratings, {} events",
        tally.score,
        tally.hits,
        tally.attempts(),
        tally.hit_rate() * 100.0,
        tally.ratings,
        sink.written()
    );
    log::info!(
        "Skill rewards {}, luck rewards {}",
        tally.skill_rewards,
        tally.luck_rewards
    );
    for (class, count) in tally.classes.iter() {
        log::info!("  {class:?}: {count}");
    }
    if diagnostics.clamped_probabilities > 0 || diagnostics.clamped_ratios > 0 {
        log::info!("Clamped inputs: {diagnostics:?}");
    }
    Ok(())
}

fn resolve<W: Write>(
    session: &mut Session<Pcg32, JsonLinesSink<W>>,
    participant: &mut Participant,
    pause: PauseRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("Pause: {:?} in {:?}", pause.reason, pause.stage);
    match pause.reason {
        PauseReason::Rating if participant.wants_grid() => {
            session.on_grid_rating(participant.grid_point())?;
        }
        PauseReason::Rating => {
            session.on_rating_input(participant.rating())?;
        }
        PauseReason::Stage | PauseReason::Demo => {
            session.on_continue()?;
        }
        PauseReason::End => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = parse_args();
    log::info!("wam-sim starting (seed {}, skill {})", args.seed, args.skill);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
