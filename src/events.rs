//! Structured session events
//!
//! Every engine decision the analysis needs is emitted as a `SessionEvent`.
//! Sinks decide where events go: the `log` facade, memory, or a JSON-lines
//! stream stamped with sequence numbers and wall-clock time.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::hit::HitClass;
use crate::engine::scorer::Attribution;
use crate::engine::state::{SessionPhase, StageId};

/// Why the session paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    Rating,
    Stage,
    Demo,
    End,
}

/// Why the skill/luck ratio changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioChange {
    Flip,
    DemoRedraw,
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    Quit,
}

/// One engine event, shaped for offline reconstruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStart {
        condition: String,
        skill_ratio: f64,
        margin: f64,
        boundaries: Vec<u32>,
    },
    MoleUp {
        x: f32,
        y: f32,
    },
    HitResult {
        attempt: u32,
        class: HitClass,
        true_hit: bool,
        margin_hit: bool,
        reported_hit: bool,
        distance: f64,
        margin: f64,
    },
    Score {
        reward: f64,
        total: f64,
        attribution: Attribution,
        skill_ratio: f64,
    },
    Pause {
        reason: PauseReason,
        stage: StageId,
    },
    Rate {
        value: u8,
    },
    GridRate {
        x: f32,
        y: f32,
    },
    SkillCheck {
        skill_ratio: f64,
        flip_counter: u32,
    },
    SkillChange {
        skill_ratio: f64,
        cause: RatioChange,
    },
    Resume {
        from: SessionPhase,
        to: SessionPhase,
    },
    End {
        reason: EndReason,
        total: f64,
    },
}

impl SessionEvent {
    /// Stable event name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SessionStart { .. } => "session_start",
            SessionEvent::MoleUp { .. } => "mole_up",
            SessionEvent::HitResult { .. } => "hit_result",
            SessionEvent::Score { .. } => "score",
            SessionEvent::Pause { .. } => "pause",
            SessionEvent::Rate { .. } => "rate",
            SessionEvent::GridRate { .. } => "grid_rate",
            SessionEvent::SkillCheck { .. } => "skill_check",
            SessionEvent::SkillChange { .. } => "skill_change",
            SessionEvent::Resume { .. } => "resume",
            SessionEvent::End { .. } => "end",
        }
    }
}

/// Receives every event the session emits
pub trait EventSink {
    fn record(&mut self, event: &SessionEvent);
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn record(&mut self, event: &SessionEvent) {
        (**self).record(event);
    }
}

/// Forwards events to the `log` facade under the `wam::events` target
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, event: &SessionEvent) {
        match serde_json::to_string(event) {
            Ok(json) => log::info!(target: "wam::events", "{json}"),
            Err(e) => log::error!(target: "wam::events", "Event {} not serialized: {e}", event.name()),
        }
    }
}

/// Keeps events in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub events: Vec<SessionEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events with the given name, in emission order
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SessionEvent> + 'a {
        self.events.iter().filter(move |e| e.name() == name)
    }

    pub fn count(&self, name: &str) -> usize {
        self.named(name).count()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: &SessionEvent) {
        self.events.push(event.clone());
    }
}

/// A stamped line of the JSON-lines log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub seq: u64,
    /// Milliseconds since the Unix epoch
    pub t_ms: u64,
    #[serde(flatten)]
    pub event: SessionEvent,
}

/// Writes one JSON object per event
///
/// Write failures are logged and kept; the first one is available from
/// [`JsonLinesSink::take_error`].
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    seq: u64,
    error: Option<std::io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            seq: 0,
            error: None,
        }
    }

    pub fn written(&self) -> u64 {
        self.seq
    }

    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &LoggedEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn record(&mut self, event: &SessionEvent) {
        let t_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let line = LoggedEvent {
            seq: self.seq,
            t_ms,
            event: event.clone(),
        };
        self.seq += 1;
        if let Err(e) = self.write_line(&line) {
            log::error!("Event log write failed: {e}");
            self.error.get_or_insert(e);
        }
    }
}
