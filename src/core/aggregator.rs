//! Composite latency and anomaly scoring.

use crate::config::CompositeWeights;
use crate::core::features::FeatureSummary;
use crate::core::stats::RollingStats;

/// Blend a window's feature summary into one composite latency value.
pub fn composite_latency(summary: &FeatureSummary, weights: &CompositeWeights) -> f64 {
    weights.dwell * summary.mean_dwell
        + weights.flight * summary.mean_flight
        + weights.pointer_interval * summary.mean_pointer_interval
        + weights.pointer_acceleration_variance * summary.pointer_acceleration_variance
}

/// Result of pushing one composite value through the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub composite: f64,
    /// Rolling standard deviation after this value was added
    pub volatility: f64,
    pub rolling_mean: f64,
    pub is_anomaly: bool,
}

/// Rolling statistics over composite values plus a cumulative anomaly count.
///
/// The newest value is part of its own baseline: it is pushed into the
/// rolling window before the mean and deviation are taken.
#[derive(Debug, Clone)]
pub struct Aggregator {
    rolling: RollingStats,
    threshold: f64,
    anomaly_count: u64,
}

impl Aggregator {
    pub fn new(window_capacity: usize, threshold: f64) -> Self {
        Self {
            rolling: RollingStats::new(window_capacity),
            threshold,
            anomaly_count: 0,
        }
    }

    pub fn push(&mut self, composite: f64) -> Aggregate {
        self.rolling.push(composite);

        let rolling_mean = self.rolling.mean();
        let std_dev = self.rolling.std_dev();
        let is_anomaly =
            std_dev > 0.0 && (composite - rolling_mean).abs() > self.threshold * std_dev;

        if is_anomaly {
            self.anomaly_count += 1;
        }

        Aggregate {
            composite,
            volatility: std_dev,
            rolling_mean,
            is_anomaly,
        }
    }

    pub fn anomaly_count(&self) -> u64 {
        self.anomaly_count
    }

    pub fn window_len(&self) -> usize {
        self.rolling.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dwell_only_composite() {
        let summary = FeatureSummary {
            mean_dwell: 120.0,
            ..FeatureSummary::default()
        };
        let composite = composite_latency(&summary, &CompositeWeights::default());
        assert!((composite - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_blend() {
        let summary = FeatureSummary {
            mean_dwell: 100.0,
            mean_flight: 200.0,
            mean_pointer_interval: 50.0,
            pointer_acceleration_variance: 10.0,
        };
        let composite = composite_latency(&summary, &CompositeWeights::default());
        assert!((composite - (30.0 + 60.0 + 10.0 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_spike_after_flat_run_is_anomaly() {
        let mut aggregator = Aggregator::new(30, 2.5);

        for _ in 0..30 {
            let aggregate = aggregator.push(0.0);
            assert!(!aggregate.is_anomaly);
            assert_eq!(aggregate.volatility, 0.0);
        }

        let spike = aggregator.push(1000.0);
        assert!(spike.is_anomaly);
        assert!(spike.volatility > 0.0);
        assert_eq!(aggregator.anomaly_count(), 1);
        assert_eq!(aggregator.window_len(), 30);
    }

    #[test]
    fn test_anomaly_count_never_decreases() {
        let mut aggregator = Aggregator::new(30, 2.5);
        let mut last = 0;

        for i in 0..200 {
            let value = if i % 37 == 36 { 5000.0 } else { (i % 5) as f64 };
            aggregator.push(value);
            assert!(aggregator.anomaly_count() >= last);
            assert!(aggregator.window_len() <= 30);
            last = aggregator.anomaly_count();
        }

        assert!(last > 0);
    }
}
