//! Append-only telemetry log.
//!
//! Records every raw key transition, every computed tick and every anomaly in
//! emission order. The log is never pruned during a session; it exists to be
//! exported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metric name of per-tick records; the value is the normalized load.
pub const METRIC_LOAD: &str = "load";

/// Metric name of anomaly records; the value is the composite latency.
pub const METRIC_COMPOSITE_LATENCY: &str = "compositeLatency";

/// What a telemetry record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelemetryKind {
    #[serde(rename = "keydown")]
    KeyDown,
    #[serde(rename = "keyup")]
    KeyUp,
    #[serde(rename = "metrics_computed")]
    MetricsComputed,
    #[serde(rename = "anomaly")]
    Anomaly,
}

impl TelemetryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryKind::KeyDown => "keydown",
            TelemetryKind::KeyUp => "keyup",
            TelemetryKind::MetricsComputed => "metrics_computed",
            TelemetryKind::Anomaly => "anomaly",
        }
    }
}

impl std::fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One telemetry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Emission time in Unix milliseconds
    pub timestamp: i64,
    pub kind: TelemetryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Per-session telemetry.
#[derive(Debug)]
pub struct TelemetryLog {
    records: Vec<TelemetryRecord>,
    session_id: Uuid,
    session_start: i64,
}

impl TelemetryLog {
    /// Create an empty log for a session starting at `session_start` (ms).
    pub fn new(session_start: i64) -> Self {
        Self {
            records: Vec::new(),
            session_id: Uuid::new_v4(),
            session_start,
        }
    }

    /// Append a record.
    pub fn record(
        &mut self,
        timestamp: i64,
        kind: TelemetryKind,
        metric: Option<&str>,
        value: Option<f64>,
    ) {
        self.records.push(TelemetryRecord {
            timestamp,
            kind,
            metric: metric.map(str::to_string),
            value,
        });
    }

    /// All records in append order.
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn count(&self, kind: TelemetryKind) -> u64 {
        self.records.iter().filter(|r| r.kind == kind).count() as u64
    }

    /// Get the current statistics as of `now` (ms).
    pub fn stats(&self, now: i64) -> TelemetryStats {
        TelemetryStats {
            session_id: self.session_id,
            key_downs: self.count(TelemetryKind::KeyDown),
            key_ups: self.count(TelemetryKind::KeyUp),
            ticks: self.count(TelemetryKind::MetricsComputed),
            anomalies: self.count(TelemetryKind::Anomaly),
            session_start: DateTime::from_timestamp_millis(self.session_start)
                .unwrap_or_default(),
            session_duration_secs: (now - self.session_start).max(0) as u64 / 1000,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self, now: i64) -> String {
        let stats = self.stats(now);
        format!(
            "Session Statistics:\n\
             - Session ID: {}\n\
             - Key presses recorded: {}\n\
             - Key releases recorded: {}\n\
             - Ticks computed: {}\n\
             - Anomalies flagged: {}\n\
             - Session duration: {} seconds",
            stats.session_id,
            stats.key_downs,
            stats.key_ups,
            stats.ticks,
            stats.anomalies,
            stats.session_duration_secs
        )
    }
}

/// Snapshot of telemetry statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub session_id: Uuid,
    pub key_downs: u64,
    pub key_ups: u64,
    pub ticks: u64,
    pub anomalies: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}
