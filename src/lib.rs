//! Synheart Load Engine - real-time cognitive load estimation.
//!
//! This library turns a live stream of keyboard and pointer events into a
//! smoothed load signal, a volatility measure and anomaly flags, sampled at a
//! fixed cadence.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Synheart Load Engine                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌───────────┐   │
//! │  │   Input   │──▶│  Event    │──▶│  Window   │──▶│ Aggregator│   │
//! │  │   Feed    │   │  Buffers  │   │ Extractor │   │ (σ, anom.)│   │
//! │  └───────────┘   └───────────┘   └───────────┘   └───────────┘   │
//! │        │                                               │         │
//! │        ▼                                               ▼         │
//! │  ┌───────────┐                   ┌───────────┐   ┌───────────┐   │
//! │  │ Telemetry │◀──────────────────│   Idle    │◀──│  Smoother │   │
//! │  │    Log    │                   │ Detector  │   │   (EMA)   │   │
//! │  └───────────┘                   └───────────┘   └───────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use synheart_load_engine::{LoadEngine, ManualClock};
//!
//! let clock = ManualClock::new(0);
//! let mut engine = LoadEngine::with_defaults(Arc::new(clock.clone()));
//! engine.start().unwrap();
//!
//! engine.record_key_down("a");
//! clock.set(120);
//! engine.record_key_up("a");
//!
//! clock.set(1000);
//! let snapshot = engine.tick().unwrap();
//! assert!(snapshot.load > 0.0);
//! ```

pub mod clock;
pub mod collector;
pub mod config;
pub mod core;
pub mod engine;
pub mod scheduler;
pub mod telemetry;

// Re-export key types at crate root for convenience
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use collector::{FeedSender, InputEvent, InputFeed, KeyEvent, PointerSample, TimedInput};
pub use config::{CompositeWeights, Config, ConfigError, EngineConfig};
pub use core::{MetricsSnapshot, PublishedState};
pub use engine::{EngineError, EngineState, LoadEngine};
pub use scheduler::{EngineRunner, ManualScheduler, RunnerHandle, ScheduledTick};
pub use telemetry::{ExportError, TelemetryKind, TelemetryLog, TelemetryRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
