//! Engagement engine configuration

use crate::EngagementError;
use face_features::GazeNormalization;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// Prefix for environment overrides, e.g. `ENGAGEMENT__FATIGUE__ENABLE_OVERRIDE=true`
pub const ENV_PREFIX: &str = "ENGAGEMENT";

/// Engagement engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Sliding window capacities
    pub history: HistoryConfig,

    /// Time budget for one emotion classifier call (milliseconds)
    pub emotion_timeout_ms: u64,

    /// How the gaze offset is normalized
    pub gaze_normalization: GazeNormalization,

    /// Continuous tiredness needed before it is confirmed (milliseconds)
    pub tired_dwell_ms: u64,

    /// PERCLOS and blink rate settings
    pub fatigue: FatigueConfig,

    /// Pending frames the analyzer task accepts before callers wait
    pub worker_queue: usize,

    pub logging: LoggingConfig,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            emotion_timeout_ms: emotion_inference::DEFAULT_TIMEOUT_MS,
            gaze_normalization: GazeNormalization::LeftEyeCenter,
            tired_dwell_ms: 30_000,
            fatigue: FatigueConfig::default(),
            worker_queue: 8,
            logging: LoggingConfig::default(),
        }
    }
}

/// Sliding window capacities (frames)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub emotions: usize,
    pub scores: usize,
    pub gaze: usize,
    pub eye_ratios: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            emotions: 15,
            scores: 15,
            gaze: 15,
            eye_ratios: 60,
        }
    }
}

/// Fatigue detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Eye ratio below which the eyes count as closed
    pub blink_threshold: f64,
    /// Closed-eye fraction above which the learner counts as drowsy
    pub perclos_threshold: f64,
    /// Normal blink rate range (blinks per minute)
    pub min_blink_rate: f64,
    pub max_blink_rate: f64,
    /// Eye ratio samples needed before fatigue is assessed
    pub min_history: usize,
    /// Window for blink counting (milliseconds)
    pub blink_window_ms: u64,
    /// Let high PERCLOS turn the frame's state into `Tired`
    pub enable_override: bool,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            blink_threshold: 0.15,
            perclos_threshold: 0.3,
            min_blink_rate: 3.0,
            max_blink_rate: 20.0,
            min_history: 10,
            blink_window_ms: 60_000,
            enable_override: false,
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn max_level(&self) -> Result<Level, EngagementError> {
        Level::from_str(self.level.trim())
            .map_err(|_| EngagementError::Config(format!("invalid log level '{}'", self.level)))
    }
}

impl EngagementConfig {
    /// Load defaults, then `path` (TOML, YAML or JSON by extension), then
    /// `ENGAGEMENT__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, EngagementError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, EngagementError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EngagementError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with the PERCLOS override switched on
    pub fn fatigue_aware() -> Self {
        Self {
            fatigue: FatigueConfig {
                enable_override: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn emotion_timeout(&self) -> Duration {
        Duration::from_millis(self.emotion_timeout_ms)
    }

    pub fn tired_dwell(&self) -> Duration {
        Duration::from_millis(self.tired_dwell_ms)
    }

    pub fn validate(&self) -> Result<(), EngagementError> {
        let h = &self.history;
        if h.emotions == 0 || h.scores == 0 || h.gaze == 0 || h.eye_ratios == 0 {
            return Err(EngagementError::Config(
                "history capacities must be non-zero".into(),
            ));
        }
        if self.emotion_timeout_ms == 0 {
            return Err(EngagementError::Config(
                "emotion_timeout_ms must be positive".into(),
            ));
        }
        if self.worker_queue == 0 {
            return Err(EngagementError::Config("worker_queue must be positive".into()));
        }

        let f = &self.fatigue;
        if !(f.blink_threshold > 0.0 && f.blink_threshold.is_finite()) {
            return Err(EngagementError::Config(format!(
                "blink_threshold {} must be positive",
                f.blink_threshold
            )));
        }
        if !(0.0..=1.0).contains(&f.perclos_threshold) {
            return Err(EngagementError::Config(format!(
                "perclos_threshold {} is outside [0, 1]",
                f.perclos_threshold
            )));
        }
        if !(f.min_blink_rate >= 0.0 && f.min_blink_rate <= f.max_blink_rate) {
            return Err(EngagementError::Config(format!(
                "blink rate range [{}, {}] is invalid",
                f.min_blink_rate, f.max_blink_rate
            )));
        }
        if f.blink_window_ms == 0 {
            return Err(EngagementError::Config(
                "blink_window_ms must be positive".into(),
            ));
        }

        self.logging.max_level()?;
        Ok(())
    }
}
