//! Core measurement pipeline for the Synheart Load Engine.
//!
//! This module contains:
//! - Event buffers with time and capacity retention
//! - Window extraction and feature computation
//! - Aggregation (composite latency, rolling statistics, anomalies)
//! - Smoothing, idle detection and the published snapshot types

pub mod aggregator;
pub mod buffers;
pub mod features;
pub mod history;
pub mod idle;
pub mod smoother;
pub mod snapshot;
pub mod stats;
pub mod windowing;

// Re-export commonly used types
pub use aggregator::{composite_latency, Aggregate, Aggregator};
pub use buffers::{CapacityCap, EventBuffer, EventBuffers};
pub use features::{compute_features, FeatureSummary, WindowFeatures};
pub use history::BoundedSeries;
pub use idle::IdleDetector;
pub use smoother::{LoadSmoother, MAX_LOAD};
pub use snapshot::{MetricsSnapshot, PublishedState};
pub use stats::{mean, population_variance, RollingStats};
pub use windowing::EventWindow;
