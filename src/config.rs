//! Configuration for the Synheart Load Engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the load engine and its CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Measurement engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Directory for telemetry CSV exports
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            export_path: default_export_path(),
        }
    }
}

fn default_export_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("synheart-load-engine")
        .join("exports")
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.engine.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synheart-load-engine")
            .join("config.json")
    }

    /// Ensure the export directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Weights of the per-tick composite latency blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub dwell: f64,
    pub flight: f64,
    pub pointer_interval: f64,
    pub pointer_acceleration_variance: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            dwell: 0.3,
            flight: 0.3,
            pointer_interval: 0.2,
            pointer_acceleration_variance: 0.2,
        }
    }
}

/// Tuning for the measurement engine.
///
/// Durations are stored as whole milliseconds on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of the feature extraction window ending at "now"
    #[serde(with = "duration_ms_serde")]
    pub window: Duration,

    /// Cadence of the tick pipeline
    #[serde(with = "duration_ms_serde")]
    pub tick_interval: Duration,

    /// Cadence of the buffer prune pass
    #[serde(with = "duration_ms_serde")]
    pub prune_interval: Duration,

    /// Events older than this are dropped by a prune pass
    #[serde(with = "duration_ms_serde")]
    pub retention: Duration,

    /// Quiet period after which the user is considered idle
    #[serde(with = "duration_ms_serde")]
    pub idle_threshold: Duration,

    /// EMA weight of the newest composite value
    pub ema_alpha: f64,

    /// Divisor mapping the smoothed latency onto the 0-100 load scale
    pub load_scale: f64,

    /// Anomaly threshold in rolling standard deviations
    pub anomaly_threshold: f64,

    /// Capacity of the rolling statistics window
    pub rolling_window: usize,

    /// Maximum length of the published load history
    pub history_capacity: usize,

    /// Maximum length of the published pointer trail
    pub trail_capacity: usize,

    /// Pointer buffer length that triggers truncation
    pub pointer_high_water: usize,

    /// Pointer buffer length kept after truncation
    pub pointer_low_water: usize,

    pub weights: CompositeWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(1000),
            tick_interval: Duration::from_millis(1000),
            prune_interval: Duration::from_millis(10_000),
            retention: Duration::from_millis(10_000),
            idle_threshold: Duration::from_millis(5000),
            ema_alpha: 0.15,
            load_scale: 2.0,
            anomaly_threshold: 2.5,
            rolling_window: 30,
            history_capacity: 200,
            trail_capacity: 100,
            pointer_high_water: 1000,
            pointer_low_water: 500,
            weights: CompositeWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("window", self.window),
            ("tick_interval", self.tick_interval),
            ("prune_interval", self.prune_interval),
        ];
        for (name, value) in intervals {
            if value.is_zero() {
                return Err(ConfigError::Invalid(format!("{name} must be non-zero")));
            }
        }

        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "ema_alpha must be in (0, 1], got {}",
                self.ema_alpha
            )));
        }
        if self.load_scale <= 0.0 {
            return Err(ConfigError::Invalid("load_scale must be positive".into()));
        }
        if self.rolling_window == 0 || self.history_capacity == 0 || self.trail_capacity == 0 {
            return Err(ConfigError::Invalid("capacities must be non-zero".into()));
        }
        if self.pointer_low_water >= self.pointer_high_water {
            return Err(ConfigError::Invalid(format!(
                "pointer_low_water ({}) must be below pointer_high_water ({})",
                self.pointer_low_water, self.pointer_high_water
            )));
        }

        Ok(())
    }

    pub(crate) fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }

    pub(crate) fn retention_ms(&self) -> i64 {
        self.retention.as_millis() as i64
    }

    pub(crate) fn idle_threshold_ms(&self) -> i64 {
        self.idle_threshold.as_millis() as i64
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as integer milliseconds.
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert_eq!(config.window, Duration::from_millis(1000));
        assert_eq!(config.tick_interval, Duration::from_millis(1000));
        assert_eq!(config.prune_interval, Duration::from_secs(10));
        assert_eq!(config.idle_threshold, Duration::from_secs(5));
        assert_eq!(config.rolling_window, 30);
        assert_eq!(config.history_capacity, 200);
        assert_eq!(config.trail_capacity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations_serialize_as_millis() {
        let json = serde_json::to_value(EngineConfig::default()).unwrap();
        assert_eq!(json["window"], 1000);
        assert_eq!(json["retention"], 10_000);

        let parsed: EngineConfig = serde_json::from_str(r#"{"idle_threshold": 250}"#).unwrap();
        assert_eq!(parsed.idle_threshold, Duration::from_millis(250));
        assert_eq!(parsed.window, Duration::from_millis(1000));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = EngineConfig {
            pointer_low_water: 1000,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = EngineConfig {
            ema_alpha: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            tick_interval: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
