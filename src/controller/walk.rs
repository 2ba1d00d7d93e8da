//! Bounded random walk used as a synthetic fallback signal

use crate::config::WalkConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random walk that stays inside `[low, high]`
#[derive(Debug, Clone)]
pub struct RandomWalk {
    value: f64,
    low: f64,
    high: f64,
    step: f64,
    rng: StdRng,
}

impl RandomWalk {
    /// Start at `start` (clamped into the bounds)
    pub fn new(config: WalkConfig, start: f64, rng: StdRng) -> Self {
        let (low, high) = if config.low <= config.high {
            (config.low, config.high)
        } else {
            (config.high, config.low)
        };
        let start = if start.is_nan() { (low + high) / 2.0 } else { start };
        Self {
            value: start.clamp(low, high),
            low,
            high,
            step: config.step.abs(),
            rng,
        }
    }

    /// Seeded walk, for reproducible runs
    pub fn seeded(config: WalkConfig, start: f64, seed: u64) -> Self {
        Self::new(config, start, StdRng::seed_from_u64(seed))
    }

    /// Take one step and return the new value
    pub fn next(&mut self) -> f64 {
        if self.step > 0.0 {
            let delta = self.rng.gen_range(-self.step..=self.step);
            self.value = (self.value + delta).clamp(self.low, self.high);
        }
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}
