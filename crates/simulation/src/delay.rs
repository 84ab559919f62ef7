//! Random (or fixed) idle delays for operatives and staff.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Length of one jitter step.
pub const DEFAULT_JITTER_UNIT: Duration = Duration::from_millis(5);

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 12345;

/// How tasks pick their unpredictable delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayConfig {
    /// Every delay is exactly this long. `Fixed(Duration::ZERO)` removes
    /// all randomness from the timing.
    Fixed(Duration),

    /// `unit * k` with `k` uniform in `1..=spread + 2`, where `spread` is
    /// supplied per call (the hold time in milliseconds of the phase the
    /// delay precedes).
    Jitter {
        /// Length of one step.
        unit: Duration,
        /// Seed for every task's stream.
        seed: u64,
    },
}

impl Default for DelayConfig {
    fn default() -> Self {
        DelayConfig::Jitter {
            unit: DEFAULT_JITTER_UNIT,
            seed: DEFAULT_SEED,
        }
    }
}

impl DelayConfig {
    /// No delays at all.
    pub fn none() -> Self {
        DelayConfig::Fixed(Duration::ZERO)
    }

    /// Replace the seed of a jitter config. Fixed configs are unchanged.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            DelayConfig::Jitter { unit, .. } => DelayConfig::Jitter { unit, seed },
            fixed => fixed,
        }
    }

    /// Independent delay stream for one task.
    ///
    /// Streams with the same seed and index produce the same sequence.
    pub fn source(&self, stream: u64) -> DelaySource {
        match *self {
            DelayConfig::Fixed(delay) => DelaySource::Fixed(delay),
            DelayConfig::Jitter { unit, seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(stream);
                DelaySource::Jitter { unit, rng }
            }
        }
    }
}

/// Per-task delay generator.
#[derive(Clone, Debug)]
pub enum DelaySource {
    /// Constant delay.
    Fixed(Duration),
    /// Seeded uniform steps.
    Jitter {
        /// Length of one step.
        unit: Duration,
        /// This task's stream.
        rng: ChaCha8Rng,
    },
}

impl DelaySource {
    /// Next delay.
    pub fn next_delay(&mut self, spread: u32) -> Duration {
        match self {
            DelaySource::Fixed(delay) => *delay,
            DelaySource::Jitter { unit, rng } => {
                let steps = rng.gen_range(1..=spread.saturating_add(2));
                *unit * steps
            }
        }
    }
}
