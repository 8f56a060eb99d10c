//! Engagement Inference Engine
//!
//! Per-frame learner engagement analysis:
//! - Eye openness and gaze offset from facial landmarks
//! - Emotion reading through an injected, time-bounded classifier
//! - Bounded engagement score and rule-based learning state
//! - Feedback suggestion per learning state
//! - Sliding signal history, fatigue indicators, and session summaries

pub mod analysis;
pub mod config;
pub mod fatigue;
pub mod feedback;
pub mod history;
pub mod logging;
pub mod score;
pub mod signals;
pub mod state;
pub mod worker;

pub use analysis::{FrameAnalysis, HeadPose, SessionSummary, NO_FACE_LABEL};
pub use config::{EngagementConfig, FatigueConfig, HistoryConfig, LoggingConfig};
pub use fatigue::{FatigueMetrics, FatigueMonitor, TirednessPhase, TirednessTracker};
pub use feedback::{Feedback, FeedbackAction};
pub use history::{SlidingHistory, WindowStats};
pub use logging::init_logging;
pub use score::{calculate_score, calculate_score_for_label};
pub use signals::{evaluate, Evaluation, FrameSignals};
pub use state::{classify_learning_state, LearningState};
pub use worker::{spawn_analyzer, AnalyzerHandle};

use analysis::SessionStats;
use emotion_inference::{EmotionAdapter, EmotionClassifier};
use face_features::{FaceMeshDetector, FeatureExtractor, FrameFeatures};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use video_frame::VideoFrame;

/// Margin added around the landmark bounding box when cropping the face
/// for emotion classification, as a fraction of the box size per side
pub const FACE_CROP_MARGIN: f64 = 0.2;

/// Engagement engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngagementError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Unknown learning state: {0}")]
    UnknownState(String),

    #[error("Analyzer task has shut down")]
    WorkerClosed,
}

/// Engagement analyzer for one learner session.
///
/// Owns all cross-frame state; analyze frames one at a time through
/// `&mut self`, or hand the analyzer to [`spawn_analyzer`].
pub struct EngagementAnalyzer<D, C> {
    config: EngagementConfig,
    detector: D,
    extractor: FeatureExtractor,
    emotions: EmotionAdapter<C>,
    history: SlidingHistory,
    fatigue: FatigueMonitor,
    tiredness: TirednessTracker,
    session: SessionStats,
    last_timestamp: Duration,
}

impl<D, C> EngagementAnalyzer<D, C>
where
    D: FaceMeshDetector,
    C: EmotionClassifier,
{
    /// Create an analyzer with a face detector and an emotion classifier
    pub fn new(config: EngagementConfig, detector: D, classifier: C) -> Result<Self, EngagementError> {
        config.validate()?;
        info!(
            "Creating engagement analyzer (gaze: {:?}, fatigue override: {})",
            config.gaze_normalization, config.fatigue.enable_override
        );

        Ok(Self {
            extractor: FeatureExtractor::new(config.gaze_normalization),
            emotions: EmotionAdapter::new(classifier, config.emotion_timeout()),
            history: SlidingHistory::new(&config.history),
            fatigue: FatigueMonitor::new(config.fatigue.clone()),
            tiredness: TirednessTracker::new(config.tired_dwell()),
            session: SessionStats::default(),
            last_timestamp: Duration::ZERO,
            detector,
            config,
        })
    }

    /// Analyze a single frame. Never fails: missing faces, partial meshes and
    /// classifier failures all map onto well-formed records.
    pub async fn analyze(&mut self, frame: &VideoFrame) -> FrameAnalysis {
        let now = Duration::from_nanos(frame.timestamp_ns);
        self.last_timestamp = now;

        let analysis = match self.detect(frame) {
            Some((features, face)) => {
                let reading = self.emotions.read(face.as_ref().unwrap_or(frame)).await;
                let signals = FrameSignals {
                    eye_ratio: features.eye_ratio,
                    gaze: features.gaze,
                    emotion: reading.emotion,
                    confidence: reading.confidence,
                };
                self.analyze_signals(&signals, now)
            }
            None => FrameAnalysis::no_face(),
        };

        self.session.record(&analysis);
        debug!(
            sequence = frame.sequence,
            state = %analysis.learning_state,
            score = analysis.score,
            "Frame analyzed"
        );
        analysis
    }

    /// Features of the face in `frame` and, when it can be located, a crop
    /// of the face for the emotion classifier
    fn detect(&self, frame: &VideoFrame) -> Option<(FrameFeatures, Option<VideoFrame>)> {
        let mesh = match self.detector.detect(frame) {
            Ok(Some(mesh)) => mesh,
            Ok(None) => return None,
            Err(e) => {
                warn!("Face detector failed: {}", e);
                return None;
            }
        };

        let features = match self.extractor.extract(&mesh) {
            Ok(features) => features,
            Err(e) => {
                debug!("Partial face mesh, treating as no face: {}", e);
                return None;
            }
        };

        let face = mesh
            .bounding_box(FACE_CROP_MARGIN, frame.width, frame.height)
            .and_then(|r| match frame.crop(r.x, r.y, r.width, r.height) {
                Ok(face) => Some(face),
                Err(e) => {
                    debug!("Face crop failed, classifying full frame: {}", e);
                    None
                }
            });
        Some((features, face))
    }

    fn analyze_signals(&mut self, signals: &FrameSignals, now: Duration) -> FrameAnalysis {
        let mut evaluation = evaluate(signals);
        self.history.record(signals, evaluation.score);
        self.fatigue.observe(signals.eye_ratio, now);

        let state = evaluation.state;
        if self.config.fatigue.enable_override
            && state != LearningState::Frustrated
            && state != LearningState::Tired
        {
            let metrics = self.fatigue.assess(self.history.eye_ratios());
            if metrics.drowsy {
                debug!(perclos = metrics.perclos, "PERCLOS override: {} -> Tired", state);
                evaluation.override_state(LearningState::Tired);
            }
        }

        self.tiredness.update(evaluation.state == LearningState::Tired, now);
        FrameAnalysis::from_signals(signals, &evaluation)
    }

    /// Fatigue indicators over the current eye ratio window
    pub fn fatigue(&self) -> FatigueMetrics {
        self.fatigue.assess(self.history.eye_ratios())
    }

    /// Dwell-gated tiredness as of the last frame
    pub fn tiredness(&self) -> TirednessPhase {
        self.tiredness.phase()
    }

    pub fn history(&self) -> &SlidingHistory {
        &self.history
    }

    pub fn summary(&self) -> SessionSummary {
        self.session.summarize(self.history.stats())
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    /// Timestamp of the last analyzed frame
    pub fn last_timestamp(&self) -> Duration {
        self.last_timestamp
    }

    pub fn emotion_classifier(&self) -> &C {
        self.emotions.classifier()
    }

    /// Reset all session state (new learner)
    pub fn reset_session(&mut self) {
        info!("Resetting engagement session");
        self.history.clear();
        self.fatigue.reset();
        self.tiredness.reset();
        self.session = SessionStats::default();
        self.last_timestamp = Duration::ZERO;
    }
}
