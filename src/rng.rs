//! Randomness port shared by every engine.
//!
//! All rolls (damage variance, critical hits, capture, flee, AI choices,
//! breeding outcomes, IV generation) go through [`GameRng`], so a test can
//! script the exact sequence of values an operation consumes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait GameRng {
    /// A uniform value in `[0, 1)`. `reason` names the roll for debugging.
    fn next_unit(&mut self, reason: &str) -> f64;

    /// A uniform integer in `[low, high]`.
    fn range_inclusive(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as f64;
        let offset = (self.next_unit(reason) * span).floor() as u32;
        low + offset.min(high - low)
    }

    /// A d100 roll, 1-100 inclusive.
    fn roll_percent(&mut self, reason: &str) -> u32 {
        self.range_inclusive(1, 100, reason)
    }

    /// True with probability `probability`.
    fn chance(&mut self, probability: f64, reason: &str) -> bool {
        self.next_unit(reason) < probability
    }

    /// A uniform index into a collection of `len` items. `len` must be > 0.
    fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        self.range_inclusive(0, len.saturating_sub(1) as u32, reason) as usize
    }
}

/// Production generator backed by `rand`'s `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl GameRng for SeededRng {
    fn next_unit(&mut self, _reason: &str) -> f64 {
        self.inner.random::<f64>()
    }
}

/// Replays a fixed list of unit values, in order.
///
/// Intended for tests: running out of values is a bug in the test setup and
/// panics with the name of the roll that wanted one more value.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    outcomes: Vec<f64>,
    index: usize,
}

impl ScriptedRng {
    pub fn new(outcomes: Vec<f64>) -> Self {
        Self { outcomes, index: 0 }
    }

    /// Values consumed so far.
    pub fn consumed(&self) -> usize {
        self.index
    }
}

impl GameRng for ScriptedRng {
    fn next_unit(&mut self, reason: &str) -> f64 {
        if self.index >= self.outcomes.len() {
            panic!(
                "ScriptedRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];

        #[cfg(test)]
        println!("[RNG] Consumed {} for: {}", outcome, reason);

        self.index += 1;
        outcome.clamp(0.0, 0.999_999_999)
    }
}

impl<R: GameRng + ?Sized> GameRng for Box<R> {
    fn next_unit(&mut self, reason: &str) -> f64 {
        (**self).next_unit(reason)
    }
}

impl<R: GameRng + ?Sized> GameRng for &mut R {
    fn next_unit(&mut self, reason: &str) -> f64 {
        (**self).next_unit(reason)
    }
}
