//! Presentation jitter for match scores
//!
//! Scores get a small random bump in `[0, JITTER_RANGE)` so repeated lookups
//! don't always show identical orderings. The source of that randomness is
//! passed in by the caller; tests use [`NoJitter`] or a fixed seed.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Exclusive upper bound of the jitter term
pub const JITTER_RANGE: u32 = 15;

/// Source of the per-candidate jitter term
pub trait ScoreJitter {
    /// Next jitter value, in `[0, JITTER_RANGE)`
    fn next_jitter(&mut self) -> u32;
}

/// Always zero; makes scoring deterministic
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl ScoreJitter for NoJitter {
    fn next_jitter(&mut self) -> u32 {
        0
    }
}

/// Reproducible jitter from a seed
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ScoreJitter for SeededJitter {
    fn next_jitter(&mut self) -> u32 {
        self.rng.gen_range(0..JITTER_RANGE)
    }
}

/// Jitter from the thread-local generator
#[derive(Debug, Clone, Default)]
pub struct RandomJitter {
    rng: ThreadRng,
}

impl RandomJitter {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl ScoreJitter for RandomJitter {
    fn next_jitter(&mut self) -> u32 {
        self.rng.gen_range(0..JITTER_RANGE)
    }
}
