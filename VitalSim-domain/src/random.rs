//! Randomness injected into the generator
//!
//! The generator never reaches for a thread-local RNG; it draws every sample
//! through [`RandomSource`] so tests can swap in seeded or scripted sources.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Source of the two distributions the simulation needs
pub trait RandomSource {
    /// Sample from a normal distribution with the given mean and standard deviation
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Sample uniformly from `[low, high]`
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Return true with the given probability
    fn chance(&mut self, probability: f64) -> bool {
        self.uniform(0.0, 1.0) < probability
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        (**self).normal(mean, std_dev)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (**self).uniform(low, high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        (**self).chance(probability)
    }
}

/// Source used by the simulator at runtime
pub type StdRandomSource = RngSource<StdRng>;

/// [`RandomSource`] backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Give back the wrapped generator
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngSource<StdRng> {
    /// Reproducible source for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // A negative or NaN spread only comes from an unvalidated profile
        match Normal::new(mean, std_dev) {
            Ok(distribution) => distribution.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.gen_bool(probability)
    }
}
