//! Seeded random source for the simulation.
//!
//! Every stochastic decision (branch angles and lengths, flower scheduling,
//! weather, plant placement) draws from an explicitly seeded [`SimRng`]
//! passed in by the caller. Nothing reads ambient global state, so identical
//! seeds replay identical gardens.

/// Deterministic random number generator backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: fastrand::Rng,
    seed: u64,
}

impl SimRng {
    /// Create a new RNG with a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
            seed,
        }
    }

    /// Seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random f32 in [0.0, 1.0).
    pub fn unit(&mut self) -> f32 {
        self.inner.f32()
    }

    /// Generate a random f32 in [min, max). Returns `min` for empty ranges.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if !(max > min) {
            return min;
        }
        min + self.inner.f32() * (max - min)
    }

    /// Generate a random integer in [min, max]. Returns `min` for empty ranges.
    pub fn range_inclusive(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        self.inner.u64(min..=max)
    }

    /// Bernoulli trial with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        if !(p > 0.0) {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.inner.f32() < p
    }

    /// Random index into a collection of `len` items.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.inner.usize(..len))
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Non-positive weights are never picked. Returns `None` when every
    /// weight is non-positive.
    pub fn weighted(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if !(total > 0.0) {
            return None;
        }

        let mut roll = self.inner.f32() * total;
        let mut last = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            if roll < w {
                return Some(i);
            }
            roll -= w;
            last = Some(i);
        }
        // Float rounding can leave a sliver past the last bucket.
        last
    }

    /// Derive an independent child generator (e.g. one per plant).
    pub fn derive(&mut self) -> Self {
        Self::new(self.inner.u64(..))
    }
}
