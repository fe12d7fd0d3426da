//! The measurement engine.
//!
//! [`LoadEngine`] owns every piece of mutable state: the event buffers, the
//! rolling statistics, the EMA accumulator, the idle tracker, the published
//! series and the telemetry log. It does no scheduling of its own; callers
//! feed it events and call [`LoadEngine::tick`] and [`LoadEngine::prune`] on
//! their cadences (see [`crate::scheduler`]).

use crate::clock::SharedClock;
use crate::collector::types::{InputEvent, KeyEvent, PointerSample};
use crate::config::{ConfigError, EngineConfig};
use crate::core::{
    composite_latency, compute_features, Aggregator, BoundedSeries, CapacityCap, EventBuffers,
    EventWindow, IdleDetector, LoadSmoother, MetricsSnapshot, PublishedState,
};
use crate::telemetry::{
    self, ExportError, TelemetryKind, TelemetryLog, METRIC_COMPOSITE_LATENCY, METRIC_LOAD,
};
use std::path::{Path, PathBuf};

/// Lifecycle of an engine instance. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Created,
    Running,
    Stopped,
}

/// Errors from engine lifecycle operations.
#[derive(Debug)]
pub enum EngineError {
    AlreadyRunning,
    Stopped,
    SpawnFailed(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::AlreadyRunning => write!(f, "Engine is already running"),
            EngineError::Stopped => write!(f, "Engine has been stopped"),
            EngineError::SpawnFailed(e) => write!(f, "Failed to spawn engine thread: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub struct LoadEngine {
    config: EngineConfig,
    clock: SharedClock,
    state: EngineState,
    buffers: EventBuffers,
    aggregator: Aggregator,
    smoother: LoadSmoother,
    idle: IdleDetector,
    snapshot: MetricsSnapshot,
    load_history: BoundedSeries<f64>,
    pointer_trail: BoundedSeries<PointerSample>,
    telemetry: TelemetryLog,
}

impl LoadEngine {
    /// Create an engine after validating `config`.
    pub fn new(config: EngineConfig, clock: SharedClock) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    /// Create an engine with the default tuning.
    pub fn with_defaults(clock: SharedClock) -> Self {
        Self::build(EngineConfig::default(), clock)
    }

    fn build(config: EngineConfig, clock: SharedClock) -> Self {
        let now = clock.now_ms();
        Self {
            buffers: EventBuffers::new(CapacityCap {
                high_water: config.pointer_high_water,
                low_water: config.pointer_low_water,
            }),
            aggregator: Aggregator::new(config.rolling_window, config.anomaly_threshold),
            smoother: LoadSmoother::new(config.ema_alpha, config.load_scale),
            idle: IdleDetector::new(config.idle_threshold_ms(), now),
            snapshot: MetricsSnapshot::default(),
            load_history: BoundedSeries::new(config.history_capacity),
            pointer_trail: BoundedSeries::new(config.trail_capacity),
            telemetry: TelemetryLog::new(now),
            state: EngineState::Created,
            clock,
            config,
        }
    }

    /// Begin accepting input. The idle timer starts from now.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Running => Err(EngineError::AlreadyRunning),
            EngineState::Stopped => Err(EngineError::Stopped),
            EngineState::Created => {
                let now = self.clock.now_ms();
                self.idle.touch(now);
                self.state = EngineState::Running;
                tracing::info!(session_id = %self.telemetry.session_id(), "load engine started");
                Ok(())
            }
        }
    }

    /// Tear down. After this no call mutates the engine. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }
        self.state = EngineState::Stopped;
        tracing::info!(
            session_id = %self.telemetry.session_id(),
            records = self.telemetry.len(),
            "load engine stopped"
        );
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Record a raw input event at the clock's current time.
    ///
    /// Returns `false` if the engine is not running and the event was ignored.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        if !self.is_running() {
            return false;
        }

        let now = self.clock.now_ms();
        self.idle.touch(now);

        match event {
            InputEvent::KeyDown { key } => {
                self.telemetry
                    .record(now, TelemetryKind::KeyDown, Some(key.as_str()), None);
                self.buffers.keys.record(KeyEvent::press(now, key));
            }
            InputEvent::KeyUp { key } => {
                self.telemetry
                    .record(now, TelemetryKind::KeyUp, Some(key.as_str()), None);
                self.buffers.keys.record(KeyEvent::release(now, key));
            }
            InputEvent::PointerMove { x, y } => {
                let sample = PointerSample::new(now, x, y);
                self.pointer_trail.push(sample);
                let evicted = self.buffers.pointer.record(sample);
                if evicted > 0 {
                    tracing::debug!(
                        evicted,
                        retained = self.buffers.pointer.len(),
                        "pointer buffer truncated"
                    );
                }
            }
        }

        true
    }

    pub fn record_key_down(&mut self, key: impl Into<String>) -> bool {
        self.handle(InputEvent::key_down(key))
    }

    pub fn record_key_up(&mut self, key: impl Into<String>) -> bool {
        self.handle(InputEvent::key_up(key))
    }

    pub fn record_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.handle(InputEvent::pointer_move(x, y))
    }

    /// Run the extraction → aggregation → smoothing → idle pipeline once.
    ///
    /// Returns the new snapshot, or `None` if the engine is not running.
    pub fn tick(&mut self) -> Option<MetricsSnapshot> {
        if !self.is_running() {
            return None;
        }

        let now = self.clock.now_ms();
        let window = EventWindow::extract(&self.buffers, now, self.config.window_ms());
        let features = compute_features(&window);
        let composite = composite_latency(&features.summary(), &self.config.weights);

        let aggregate = self.aggregator.push(composite);
        if aggregate.is_anomaly {
            tracing::info!(
                composite,
                rolling_mean = aggregate.rolling_mean,
                volatility = aggregate.volatility,
                "composite latency anomaly"
            );
            self.telemetry.record(
                now,
                TelemetryKind::Anomaly,
                Some(METRIC_COMPOSITE_LATENCY),
                Some(composite),
            );
        }

        let load = self.smoother.update(composite);
        let idle = self.idle.is_idle(now);

        let snapshot = MetricsSnapshot {
            load: if idle { 0.0 } else { load },
            volatility: if idle { 0.0 } else { aggregate.volatility },
            sample_count: window.event_count(),
            buffer_size: self.buffers.pointer.len(),
            anomaly_count: self.aggregator.anomaly_count(),
            idle,
        };

        self.snapshot = snapshot;
        self.load_history.push(snapshot.load);
        self.telemetry
            .record(now, TelemetryKind::MetricsComputed, Some(METRIC_LOAD), Some(load));

        tracing::debug!(
            composite,
            load = snapshot.load,
            volatility = snapshot.volatility,
            samples = snapshot.sample_count,
            idle,
            "tick"
        );

        Some(snapshot)
    }

    /// Drop buffered events older than the retention horizon.
    ///
    /// Returns `(keys_removed, pointer_removed)`.
    pub fn prune(&mut self) -> (usize, usize) {
        if !self.is_running() {
            return (0, 0);
        }

        let cutoff = self.clock.now_ms() - self.config.retention_ms();
        let removed = self.buffers.prune(cutoff);
        tracing::debug!(
            cutoff,
            keys_removed = removed.0,
            pointer_removed = removed.1,
            "pruned event buffers"
        );
        removed
    }

    /// The most recent snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot
    }

    pub fn load_history(&self) -> Vec<f64> {
        self.load_history.to_vec()
    }

    pub fn pointer_trail(&self) -> Vec<PointerSample> {
        self.pointer_trail.to_vec()
    }

    /// Value copy of everything published to readers.
    pub fn published(&self) -> PublishedState {
        PublishedState {
            snapshot: self.snapshot,
            load_history: self.load_history(),
            pointer_trail: self.pointer_trail(),
        }
    }

    pub fn telemetry(&self) -> &TelemetryLog {
        &self.telemetry
    }

    /// Number of composite values currently in the rolling window.
    pub fn rolling_window_len(&self) -> usize {
        self.aggregator.window_len()
    }

    pub fn key_buffer_len(&self) -> usize {
        self.buffers.keys.len()
    }

    pub fn pointer_buffer_len(&self) -> usize {
        self.buffers.pointer.len()
    }

    /// Current smoothed composite latency, before normalization.
    pub fn ema(&self) -> f64 {
        self.smoother.ema()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Render the full telemetry log as CSV.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        telemetry::to_csv(self.telemetry.records())
    }

    /// Write the telemetry CSV into `dir`, named after the current time.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        telemetry::write_csv(dir, self.telemetry.records(), self.clock.now_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn engine_at(start: i64) -> (LoadEngine, ManualClock) {
        let clock = ManualClock::new(start);
        let mut engine = LoadEngine::with_defaults(Arc::new(clock.clone()));
        engine.start().unwrap();
        (engine, clock)
    }

    #[test]
    fn test_events_ignored_before_start() {
        let clock = ManualClock::new(0);
        let mut engine = LoadEngine::with_defaults(Arc::new(clock));

        assert!(!engine.record_key_down("a"));
        assert!(engine.tick().is_none());
        assert!(engine.telemetry().is_empty());
    }

    #[test]
    fn test_start_twice_and_after_stop() {
        let (mut engine, _clock) = engine_at(0);
        assert!(matches!(engine.start(), Err(EngineError::AlreadyRunning)));

        engine.stop();
        assert!(matches!(engine.start(), Err(EngineError::Stopped)));
    }

    #[test]
    fn test_pointer_moves_not_logged_but_trailed() {
        let (mut engine, clock) = engine_at(0);

        for i in 0..150 {
            clock.set(i);
            engine.record_pointer_move(i as f64, 0.0);
        }

        assert!(engine.telemetry().is_empty());
        assert_eq!(engine.pointer_trail().len(), 100);
        assert_eq!(engine.pointer_buffer_len(), 150);
    }

    #[test]
    fn test_pointer_buffer_cap() {
        let (mut engine, clock) = engine_at(0);

        for i in 0..1001 {
            clock.set(i);
            engine.record_pointer_move(0.0, 0.0);
        }

        assert_eq!(engine.pointer_buffer_len(), 500);
    }

    #[test]
    fn test_prune_uses_retention_horizon() {
        let (mut engine, clock) = engine_at(0);
        engine.record_key_down("a");
        clock.set(5000);
        engine.record_key_up("a");

        clock.set(10_000);
        assert_eq!(engine.prune(), (1, 0));
        assert_eq!(engine.key_buffer_len(), 1);

        clock.set(15_001);
        engine.prune();
        assert_eq!(engine.key_buffer_len(), 0);
    }

    #[test]
    fn test_tick_records_metrics_telemetry() {
        let (mut engine, clock) = engine_at(0);
        clock.set(1000);
        let snapshot = engine.tick().unwrap();

        assert!(!snapshot.idle);
        assert_eq!(snapshot.load, 0.0);

        let last = engine.telemetry().records().last().unwrap();
        assert_eq!(last.kind, TelemetryKind::MetricsComputed);
        assert_eq!(last.metric.as_deref(), Some("load"));
        assert_eq!(last.timestamp, 1000);
    }

    #[test]
    fn test_spike_logs_one_anomaly_record() {
        let (mut engine, clock) = engine_at(0);

        for t in 1..=30 {
            clock.set(t * 1000);
            engine.tick().unwrap();
        }
        assert_eq!(engine.snapshot().anomaly_count, 0);

        // A single 900 ms hold gives composite = 0.3 * 900 = 270.
        clock.set(30_100);
        engine.record_key_down("a");
        clock.set(31_000);
        engine.record_key_up("a");
        let snapshot = engine.tick().unwrap();

        assert_eq!(snapshot.anomaly_count, 1);

        let records = engine.telemetry().records();
        let anomalies: Vec<_> = records
            .iter()
            .filter(|r| r.kind == TelemetryKind::Anomaly)
            .collect();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].timestamp, 31_000);
        assert_eq!(anomalies[0].metric.as_deref(), Some(METRIC_COMPOSITE_LATENCY));
        assert!((anomalies[0].value.unwrap() - 270.0).abs() < 1e-9);

        // The anomaly is logged ahead of the tick's own record.
        let tail = &records[records.len() - 2..];
        assert_eq!(tail[0].kind, TelemetryKind::Anomaly);
        assert_eq!(tail[1].kind, TelemetryKind::MetricsComputed);
    }
}
