// Deterministic random sources for testing
// This module is only available to unit tests or when the "mock" feature is enabled

use std::collections::VecDeque;

use crate::random::RandomSource;

/// Source that always returns the centre of what it is asked for
///
/// `normal` yields the mean. `uniform` yields `low + fraction * (high - low)`,
/// with the fraction defaulting to one half; a fraction of `0.0` makes every
/// `chance` draw succeed and picks the low end of every magnitude.
#[derive(Debug, Clone, Copy)]
pub struct MeanRandomSource {
    uniform_fraction: f64,
}

impl Default for MeanRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MeanRandomSource {
    pub fn new() -> Self {
        Self {
            uniform_fraction: 0.5,
        }
    }

    /// Configure where in `[low, high]` uniform draws land
    pub fn with_uniform_fraction(mut self, fraction: f64) -> Self {
        self.uniform_fraction = fraction;
        self
    }
}

impl RandomSource for MeanRandomSource {
    fn normal(&mut self, mean: f64, _std_dev: f64) -> f64 {
        mean
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.uniform_fraction * (high - low)
    }
}

/// Source that replays queued values, ignoring the requested parameters
///
/// Once a queue runs dry the source falls back to [`MeanRandomSource`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandomSource {
    normals: VecDeque<f64>,
    uniforms: VecDeque<f64>,
    fallback: MeanRandomSource,
}

impl ScriptedRandomSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue values returned by successive `normal` calls
    pub fn with_normals(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.normals.extend(values);
        self
    }

    /// Queue values returned by successive `uniform` calls
    pub fn with_uniforms(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(values);
        self
    }

    /// Values not yet consumed, as `(normals, uniforms)`
    pub fn remaining(&self) -> (usize, usize) {
        (self.normals.len(), self.uniforms.len())
    }
}

impl RandomSource for ScriptedRandomSource {
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match self.normals.pop_front() {
            Some(value) => value,
            None => self.fallback.normal(mean, std_dev),
        }
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        match self.uniforms.pop_front() {
            Some(value) => value,
            None => self.fallback.uniform(low, high),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_replays_then_falls_back() {
        let mut source = ScriptedRandomSource::new()
            .with_normals([1.0, 2.0])
            .with_uniforms([0.3]);

        assert_eq!(source.normal(50.0, 5.0), 1.0);
        assert_eq!(source.normal(50.0, 5.0), 2.0);
        assert_eq!(source.normal(50.0, 5.0), 50.0);
        assert_eq!(source.uniform(0.0, 10.0), 0.3);
        assert_eq!(source.uniform(0.0, 10.0), 5.0);
        assert_eq!(source.remaining(), (0, 0));
    }

    #[test]
    fn test_mean_source_chance() {
        assert!(!MeanRandomSource::new().chance(0.1));
        assert!(MeanRandomSource::new().with_uniform_fraction(0.0).chance(0.1));
    }
}
