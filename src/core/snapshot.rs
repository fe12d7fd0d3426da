//! Published metrics.

use crate::collector::types::PointerSample;
use serde::{Deserialize, Serialize};

/// The "current" metrics, replaced wholesale on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Normalized load in [0, 100]; 0 while idle
    pub load: f64,
    /// Rolling standard deviation of composite latency; 0 while idle
    pub volatility: f64,
    /// Key and pointer events in the last extraction window
    pub sample_count: usize,
    /// Current pointer buffer length
    pub buffer_size: usize,
    /// Anomalies seen this session
    pub anomaly_count: u64,
    pub idle: bool,
}

impl Default for MetricsSnapshot {
    /// Before the first tick nothing has been observed, which reads as idle.
    fn default() -> Self {
        Self {
            load: 0.0,
            volatility: 0.0,
            sample_count: 0,
            buffer_size: 0,
            anomaly_count: 0,
            idle: true,
        }
    }
}

/// Everything the engine publishes to downstream readers, as value copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishedState {
    pub snapshot: MetricsSnapshot,
    pub load_history: Vec<f64>,
    pub pointer_trail: Vec<PointerSample>,
}
