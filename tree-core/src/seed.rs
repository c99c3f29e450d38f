//! Sine-hash pseudo-randomness and the seed cursor that orders it.
//!
//! Every random value in a tree is a pure function of an integer seed, and
//! the seeds themselves come from a [`SeedCursor`] that counts upward from a
//! base. Reordering draws changes the tree.

use crate::types::Seed;

/// Maps an integer seed to a pseudo-random value in `[-1, 1)`.
///
/// `x = sin(seed) * 10000`, and the fractional part of `x` is rescaled.
#[inline]
pub fn seeded_random(seed: Seed) -> f64 {
    let x = (seed as f64).sin() * 10000.0;
    (x - x.floor()) * 2.0 - 1.0
}

/// Monotonic seed counter owned by a single generation pass.
#[derive(Clone, Debug)]
pub struct SeedCursor {
    base: Seed,
    counter: u64,
}

impl SeedCursor {
    pub fn new(base: Seed) -> Self {
        Self { base, counter: 0 }
    }

    /// Returns `base + counter` and advances the counter.
    #[inline]
    pub fn next_seed(&mut self) -> Seed {
        let seed = self.base.wrapping_add(self.counter);
        self.counter += 1;
        seed
    }

    /// Draws the next seed and hashes it.
    #[inline]
    pub fn next_random(&mut self) -> f64 {
        seeded_random(self.next_seed())
    }

    pub fn base(&self) -> Seed {
        self.base
    }

    /// Number of seeds handed out so far.
    pub fn consumed(&self) -> u64 {
        self.counter
    }
}
