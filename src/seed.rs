//! Random-order seed handling
//!
//! The server orders "random" listings deterministically from a seed, so
//! paging through a shuffled list stays consistent as long as the seed does.
//! [`SeedController`] decides when a new seed is drawn.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::query::SortMode;

/// Seed in `[0, 1)` used for random ordering
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct RandomSeed(f64);

impl RandomSeed {
    /// Wrap a raw value, folding anything outside `[0, 1)` back into range
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_finite() && (0.0..1.0).contains(&value) {
            Self(value)
        } else if value.is_finite() {
            Self(value.abs().fract())
        } else {
            Self(0.0)
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Integer form sent to the server: `floor(seed * 1_000_000)`
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_server(self) -> u32 {
        (self.0 * 1_000_000.0).floor() as u32
    }
}

impl fmt::Display for RandomSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_server())
    }
}

/// Draws seeds on mount, on reshuffle and when sorting switches to random
pub struct SeedController {
    rng: StdRng,
}

impl SeedController {
    /// Controller backed by an OS-seeded generator
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic controller for tests and demos
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a fresh seed
    pub fn draw(&mut self) -> RandomSeed {
        RandomSeed::new(self.rng.random::<f64>())
    }

    /// Re-roll `seed` if sorting just switched into random mode
    ///
    /// Returns whether a new seed was drawn.
    pub fn on_sort_change(
        &mut self,
        previous: SortMode,
        next: SortMode,
        seed: &mut RandomSeed,
    ) -> bool {
        if next.is_random() && !previous.is_random() {
            *seed = self.draw();
            true
        } else {
            false
        }
    }

    /// Unconditionally replace `seed`
    pub fn reshuffle(&mut self, seed: &mut RandomSeed) {
        *seed = self.draw();
    }
}

impl Default for SeedController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SeedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedController").finish_non_exhaustive()
    }
}
