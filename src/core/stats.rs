//! Total statistics helpers and the rolling statistics window.
//!
//! Every function here is defined for empty and short inputs: a mean of
//! nothing is 0, and a variance of fewer than two samples is 0.

use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Arithmetic mean, or 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    mean_of(values.iter(), values.len())
}

/// Population variance (divides by N), or 0 for fewer than two samples.
pub fn population_variance(values: &[f64]) -> f64 {
    population_variance_of(values.iter(), values.len())
}

fn mean_of<'a, I>(values: I, len: usize) -> f64
where
    I: Iterator<Item = &'a f64>,
{
    if len == 0 {
        return 0.0;
    }
    values.mean()
}

fn population_variance_of<'a, I>(values: I, len: usize) -> f64
where
    I: Iterator<Item = &'a f64>,
{
    if len < 2 {
        return 0.0;
    }
    // Rounding can push a flat series a hair below zero.
    values.population_variance().max(0.0)
}

/// Fixed-capacity FIFO of recent values.
#[derive(Debug, Clone)]
pub struct RollingStats {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest once full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn mean(&self) -> f64 {
        mean_of(self.values.iter(), self.values.len())
    }

    pub fn std_dev(&self) -> f64 {
        population_variance_of(self.values.iter(), self.values.len()).sqrt()
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_short_inputs() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_variance(&[]), 0.0);
        assert_eq!(population_variance(&[42.0]), 0.0);
    }

    #[test]
    fn test_population_statistics() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-9);
        assert!((population_variance(&values) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_window_evicts_oldest() {
        let mut rolling = RollingStats::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            rolling.push(v);
            assert!(rolling.len() <= 3);
        }

        assert_eq!(rolling.len(), 3);
        assert!((rolling.mean() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_window_has_zero_std() {
        let mut rolling = RollingStats::new(30);
        for _ in 0..30 {
            rolling.push(7.5);
        }
        assert_eq!(rolling.std_dev(), 0.0);
    }
}
