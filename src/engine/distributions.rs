//! Gaussian samplers over an injected RNG
//!
//! The truncated sampler draws from the exact truncated-normal law. Which
//! proposal it uses depends on where the standardized window `[a, b]` sits:
//! - straddling zero and wide: plain rejection from the normal
//! - straddling zero and narrow: uniform proposal on the window
//! - one-sided: Robert (1995) exponential tail proposal, or uniform when the
//!   window is short relative to the tail rate

use rand::Rng;
use rand_distr::{Exp1, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::DistributionError;

/// Windows straddling zero narrower than this use the uniform proposal
const NARROW_STRADDLE: f64 = 2.0;

/// One draw from `N(mean, sd²)`
#[inline]
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + sd * z
}

/// One draw from `N(mean, sd²)` restricted to `[low, high]`
///
/// Parameters are expected to be pre-validated (see [`TruncatedNormal::new`]);
/// an empty window collapses to `low`.
pub fn sample_truncated_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    sd: f64,
    low: f64,
    high: f64,
) -> f64 {
    if low >= high || sd <= 0.0 {
        return mean.clamp(low, high.max(low));
    }
    let a = (low - mean) / sd;
    let b = (high - mean) / sd;
    let z = standard_truncated(rng, a, b);
    (mean + sd * z).clamp(low, high)
}

/// A validated truncated normal distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruncatedNormal {
    pub mean: f64,
    pub sd: f64,
    pub low: f64,
    pub high: f64,
}

impl TruncatedNormal {
    pub fn new(mean: f64, sd: f64, low: f64, high: f64) -> Result<Self, DistributionError> {
        if !mean.is_finite() {
            return Err(DistributionError::BadMean(mean));
        }
        if !(sd.is_finite() && sd >= 0.0) {
            return Err(DistributionError::BadDeviation(sd));
        }
        if low.is_nan() || high.is_nan() || low > high {
            return Err(DistributionError::EmptyWindow { low, high });
        }
        Ok(Self {
            mean,
            sd,
            low,
            high,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        sample_truncated_normal(rng, self.mean, self.sd, self.low, self.high)
    }
}

/// Standard normal restricted to `[a, b]`, `a < b`
fn standard_truncated<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    if b <= 0.0 {
        // Mirror onto the positive side
        return -standard_truncated(rng, -b, -a);
    }
    if a >= 0.0 {
        let alpha = 0.5 * (a + (a * a + 4.0).sqrt());
        return if alpha * (b - a) >= 1.0 {
            exponential_tail(rng, a, b, alpha)
        } else {
            uniform_proposal(rng, a, b, a * a)
        };
    }
    if b - a < NARROW_STRADDLE {
        uniform_proposal(rng, a, b, 0.0)
    } else {
        loop {
            let z: f64 = rng.sample(StandardNormal);
            if z >= a && z <= b {
                return z;
            }
        }
    }
}

/// Robert's exponential proposal for `[a, b]` with `a >= 0`
fn exponential_tail<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64, alpha: f64) -> f64 {
    loop {
        let e: f64 = rng.sample(Exp1);
        let z = a + e / alpha;
        if z > b {
            continue;
        }
        let accept = (-0.5 * (z - alpha) * (z - alpha)).exp();
        if rng.random::<f64>() <= accept {
            return z;
        }
    }
}

/// Uniform proposal on a finite `[a, b]`; `peak_sq` is the squared point of
/// highest density inside the window (0 when it straddles zero)
fn uniform_proposal<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64, peak_sq: f64) -> f64 {
    loop {
        let z = a + (b - a) * rng.random::<f64>();
        let accept = (0.5 * (peak_sq - z * z)).exp();
        if rng.random::<f64>() <= accept {
            return z;
        }
    }
}
