//! The single seeded random stream every reward draw consumes.
//! Outcomes depend on draw order, so callers must keep the sequence of engine calls stable
//! across save and resume.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

#[derive(Clone, Debug)]
pub struct RunRng {
    seed: u64,
    inner: ChaCha8Rng,
    draws: u64,
}

impl RunRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, inner: ChaCha8Rng::seed_from_u64(seed), draws: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values consumed since the last seeding.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform integer in `[0, range)`. A zero range yields zero without consuming a draw.
    pub fn int(&mut self, range: u32) -> u32 {
        if range == 0 {
            return 0;
        }
        self.draws += 1;
        (self.inner.next_u64() % u64::from(range)) as u32
    }

    /// Uniform integer in `[min, min + range)`.
    pub fn int_from(&mut self, range: u32, min: u32) -> u32 {
        min.saturating_add(self.int(range))
    }

    pub fn chance_percent(&mut self, percent: u32) -> bool {
        self.int(100) < percent
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.int(items.len() as u32) as usize;
        items.get(index)
    }
}
