//! Fatigue extension point: PERCLOS, blink rate, and tired dwell tracking

use crate::config::FatigueConfig;
use face_features::StatisticalFeatures;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info};

/// Windowed fatigue indicators
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FatigueMetrics {
    /// Eye ratio samples in the window
    pub samples: usize,
    /// Fraction of samples with the eyes closed (0.0-1.0)
    pub perclos: f64,
    /// Blinks per minute, once enough history exists
    pub blink_rate: Option<f64>,
    /// PERCLOS above threshold with enough history
    pub drowsy: bool,
    /// Blink rate outside the normal range
    pub abnormal_blink_rate: bool,
}

/// Tracks eye closures and blinks from the per-frame eye ratio
#[derive(Debug, Clone)]
pub struct FatigueMonitor {
    config: FatigueConfig,
    eyes_closed: bool,
    /// Timestamps of completed blinks within the blink window
    blinks: VecDeque<Duration>,
    first_sample: Option<Duration>,
    last_sample: Option<Duration>,
}

impl FatigueMonitor {
    pub fn new(config: FatigueConfig) -> Self {
        Self {
            config,
            eyes_closed: false,
            blinks: VecDeque::new(),
            first_sample: None,
            last_sample: None,
        }
    }

    /// Feed one eye ratio sample taken at `now`
    pub fn observe(&mut self, eye_ratio: f64, now: Duration) {
        self.first_sample.get_or_insert(now);
        self.last_sample = Some(now);

        let closed = eye_ratio < self.config.blink_threshold;
        if self.eyes_closed && !closed {
            debug!("Blink completed at {:?}", now);
            self.blinks.push_back(now);
        }
        self.eyes_closed = closed;

        let window = Duration::from_millis(self.config.blink_window_ms);
        while let Some(&oldest) = self.blinks.front() {
            if now.saturating_sub(oldest) > window {
                self.blinks.pop_front();
            } else {
                break;
            }
        }
    }

    /// Assess fatigue from the eye ratio window
    pub fn assess<'a, I>(&self, eye_ratios: I) -> FatigueMetrics
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let ratios: Vec<f64> = eye_ratios.into_iter().copied().collect();
        let samples = ratios.len();
        let perclos = StatisticalFeatures::fraction_below(ratios, self.config.blink_threshold);
        let enough_history = samples >= self.config.min_history;

        let blink_rate = match (self.first_sample, self.last_sample) {
            (Some(first), Some(last)) if enough_history => {
                let window = Duration::from_millis(self.config.blink_window_ms);
                let span = last.saturating_sub(first).min(window);
                if span.is_zero() {
                    None
                } else {
                    Some(self.blinks.len() as f64 / (span.as_secs_f64() / 60.0))
                }
            }
            _ => None,
        };

        FatigueMetrics {
            samples,
            perclos,
            blink_rate,
            drowsy: enough_history && perclos > self.config.perclos_threshold,
            abnormal_blink_rate: blink_rate.map_or(false, |rate| {
                rate < self.config.min_blink_rate || rate > self.config.max_blink_rate
            }),
        }
    }

    pub fn reset(&mut self) {
        self.eyes_closed = false;
        self.blinks.clear();
        self.first_sample = None;
        self.last_sample = None;
    }
}

/// Dwell-gated tiredness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TirednessPhase {
    #[default]
    Normal,
    /// Tired since `since_ms`, dwell not yet reached
    TiredCandidate { since_ms: u64 },
    /// Tired continuously for at least the dwell time
    ConfirmedTired { since_ms: u64 },
}

/// Promotes sustained tiredness to a confirmed state after a dwell time
#[derive(Debug, Clone)]
pub struct TirednessTracker {
    dwell: Duration,
    phase: TirednessPhase,
}

impl TirednessTracker {
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            phase: TirednessPhase::Normal,
        }
    }

    pub fn phase(&self) -> TirednessPhase {
        self.phase
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.phase, TirednessPhase::ConfirmedTired { .. })
    }

    /// Advance with this frame's verdict at monotonic time `now`
    pub fn update(&mut self, tired: bool, now: Duration) -> TirednessPhase {
        let now_ms = now.as_millis() as u64;
        self.phase = match (self.phase, tired) {
            (_, false) => {
                if self.phase != TirednessPhase::Normal {
                    debug!("Tiredness cleared");
                }
                TirednessPhase::Normal
            }
            (TirednessPhase::Normal, true) => TirednessPhase::TiredCandidate { since_ms: now_ms },
            (TirednessPhase::TiredCandidate { since_ms }, true) => {
                let elapsed = Duration::from_millis(now_ms.saturating_sub(since_ms));
                if elapsed >= self.dwell {
                    info!("Learner tired for {:?}, tiredness confirmed", elapsed);
                    TirednessPhase::ConfirmedTired { since_ms }
                } else {
                    TirednessPhase::TiredCandidate { since_ms }
                }
            }
            (confirmed @ TirednessPhase::ConfirmedTired { .. }, true) => confirmed,
        };
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = TirednessPhase::Normal;
    }
}
