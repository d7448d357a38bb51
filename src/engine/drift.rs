//! Drifting scalar process
//!
//! Evolves a value over successive calls: a deterministic trend indexed by the
//! call count, plus optional Gaussian noise, then positivity and clipping.
//! Used to move the hit margin over the course of a session.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::distributions::{TruncatedNormal, sample_normal};
use crate::error::ConfigError;

/// Trend applied on each call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DriftKind {
    /// No movement at all
    #[default]
    #[serde(rename = "static")]
    Static,
    /// `amplitude * sin(n)`
    #[serde(rename = "sin", alias = "sinusoidal")]
    Sinusoidal,
    /// `gradient * n`
    #[serde(rename = "linear")]
    Linear,
    /// Sum of the linear and sinusoidal trends
    #[serde(rename = "linear+sin", alias = "linear+sinusoidal")]
    LinearSinusoidal,
    /// Uniform draw in `[-amplitude, amplitude]` each call
    #[serde(rename = "random", alias = "random-walk")]
    Random,
}

impl DriftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftKind::Static => "static",
            DriftKind::Sinusoidal => "sin",
            DriftKind::Linear => "linear",
            DriftKind::LinearSinusoidal => "linear+sin",
            DriftKind::Random => "random",
        }
    }

    /// Deterministic part of the displacement at call `n`
    fn trend(&self, n: f64, gradient: f64, amplitude: f64) -> f64 {
        match self {
            DriftKind::Static | DriftKind::Random => 0.0,
            DriftKind::Sinusoidal => amplitude * n.sin(),
            DriftKind::Linear => gradient * n,
            DriftKind::LinearSinusoidal => amplitude * n.sin() + gradient * n,
        }
    }
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriftKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(DriftKind::Static),
            "sin" | "sinusoidal" => Ok(DriftKind::Sinusoidal),
            "linear" => Ok(DriftKind::Linear),
            "linear+sin" | "linear+sinusoidal" => Ok(DriftKind::LinearSinusoidal),
            "random" | "random-walk" => Ok(DriftKind::Random),
            _ => Err(ConfigError::UnknownName {
                kind: "drift",
                name: s.to_string(),
            }),
        }
    }
}

/// Drift parameters as stored in the experiment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    pub drift_type: DriftKind,
    pub gradient: f64,
    pub amplitude: f64,

    // === Noise ===
    pub noise: bool,
    pub noise_mean: f64,
    pub noise_sd: f64,
    pub noise_truncated: bool,
    pub noise_low_bnd: f64,
    pub noise_high_bnd: f64,

    // === Output constraints ===
    pub always_pos: bool,
    pub drift_clip: bool,
    pub clip_low_bnd: f64,
    pub clip_high_bnd: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            drift_type: DriftKind::Static,
            gradient: 1.0,
            amplitude: 1.0,
            noise: false,
            noise_mean: 10.0,
            noise_sd: 10.0,
            noise_truncated: true,
            noise_low_bnd: 0.0,
            noise_high_bnd: 10.0,
            always_pos: true,
            drift_clip: false,
            clip_low_bnd: 0.0,
            clip_high_bnd: 10.0,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("gradient", self.gradient),
            ("amplitude", self.amplitude),
            ("noise_mean", self.noise_mean),
            ("clip_low_bnd", self.clip_low_bnd),
            ("clip_high_bnd", self.clip_high_bnd),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if self.noise {
            self.noise_model()?;
        }
        if self.drift_clip && self.clip_low_bnd > self.clip_high_bnd {
            return Err(ConfigError::InvertedBounds {
                low_field: "clip_low_bnd",
                high_field: "clip_high_bnd",
                low: self.clip_low_bnd,
                high: self.clip_high_bnd,
            });
        }
        Ok(())
    }

    /// Smallest value `advance()` can return for a process starting at `initial`
    ///
    /// `None` when the output is unbounded below.
    pub fn lower_bound(&self, initial: f64) -> Option<f64> {
        if self.drift_type == DriftKind::Static {
            return Some(initial);
        }
        match (self.always_pos, self.drift_clip) {
            (true, true) => Some(self.clip_low_bnd.max(0.0).min(self.clip_high_bnd)),
            (true, false) => Some(0.0),
            (false, true) => Some(self.clip_low_bnd),
            (false, false) => None,
        }
    }

    fn noise_model(&self) -> Result<NoiseModel, ConfigError> {
        if self.noise_truncated {
            let dist = TruncatedNormal::new(
                self.noise_mean,
                self.noise_sd,
                self.noise_low_bnd,
                self.noise_high_bnd,
            )?;
            Ok(NoiseModel::Truncated(dist))
        } else {
            // Same parameter checks, unbounded window
            TruncatedNormal::new(self.noise_mean, self.noise_sd, f64::MIN, f64::MAX)?;
            Ok(NoiseModel::Plain {
                mean: self.noise_mean,
                sd: self.noise_sd,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NoiseModel {
    Off,
    Plain { mean: f64, sd: f64 },
    Truncated(TruncatedNormal),
}

/// A scalar that drifts each time it is advanced
#[derive(Debug, Clone)]
pub struct DriftProcess {
    initial_value: f64,
    last_value: f64,
    call_count: u64,
    config: DriftConfig,
    noise: NoiseModel,
}

impl DriftProcess {
    pub fn new(initial_value: f64, config: DriftConfig) -> Result<Self, ConfigError> {
        if !initial_value.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "initial_value",
                value: initial_value,
            });
        }
        config.validate()?;
        let noise = if config.noise {
            config.noise_model()?
        } else {
            NoiseModel::Off
        };
        Ok(Self {
            initial_value,
            last_value: initial_value,
            call_count: 0,
            config,
            noise,
        })
    }

    /// A process that never moves
    pub fn fixed(value: f64) -> Result<Self, ConfigError> {
        Self::new(value, DriftConfig::default())
    }

    /// Step the process and return the new value
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let cfg = &self.config;
        if cfg.drift_type == DriftKind::Static {
            return self.last_value;
        }

        let n = self.call_count as f64;
        let displacement = match cfg.drift_type {
            DriftKind::Random => (rng.random::<f64>() - 0.5) * 2.0 * cfg.amplitude,
            kind => kind.trend(n, cfg.gradient, cfg.amplitude),
        };
        let noise = match self.noise {
            NoiseModel::Off => 0.0,
            NoiseModel::Plain { mean, sd } => sample_normal(rng, mean, sd),
            NoiseModel::Truncated(dist) => dist.sample(rng),
        };
        let mut value = self.initial_value + displacement + noise;
        self.call_count += 1;

        if cfg.always_pos && value <= 0.0 {
            value = 0.0;
        }
        if cfg.drift_clip {
            value = value.clamp(cfg.clip_low_bnd, cfg.clip_high_bnd);
        }

        self.last_value = value;
        value
    }

    /// Restart the trend without moving the current value
    pub fn reset_counter(&mut self) {
        self.call_count = 0;
    }

    pub fn current(&self) -> f64 {
        self.last_value
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    pub fn kind(&self) -> DriftKind {
        self.config.drift_type
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }
}
