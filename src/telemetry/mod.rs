//! Telemetry module for the Synheart Load Engine.
//!
//! This module keeps the session's append-only record of raw key events,
//! computed ticks and anomalies, and renders it as CSV on demand.

pub mod export;
pub mod log;

// Re-export commonly used types
pub use export::{export_filename, iso_timestamp, to_csv, write_csv, ExportError, CSV_HEADER};
pub use log::{
    TelemetryKind, TelemetryLog, TelemetryRecord, TelemetryStats, METRIC_COMPOSITE_LATENCY,
    METRIC_LOAD,
};
