//! Per-frame analysis record and session summaries

use crate::feedback::Feedback;
use crate::history::WindowStats;
use crate::score::round2;
use crate::signals::{Evaluation, FrameSignals};
use crate::state::LearningState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emotion label reported when no face is in view
pub const NO_FACE_LABEL: &str = "No face";

/// Head pose (Euler angles). Not estimated; always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// Complete analysis result for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Emotion label, or [`NO_FACE_LABEL`]
    pub emotion: String,
    /// Engagement score (2 decimals)
    pub score: f64,
    pub learning_state: LearningState,
    /// Emotion confidence (2 decimals)
    pub confidence: f64,
    /// Eye openness ratio (2 decimals)
    pub eye_ratio: f64,
    /// Gaze offset x, y (2 decimals each)
    pub gaze_offset: [f64; 2],
    /// Reserved, always false
    pub is_sleeping: bool,
    /// Reserved, always zero
    pub head_pose: HeadPose,
    pub feedback: Feedback,
}

impl FrameAnalysis {
    /// Record for a frame with a usable face
    pub fn from_signals(signals: &FrameSignals, evaluation: &Evaluation) -> Self {
        Self {
            emotion: signals.emotion.as_str().to_string(),
            score: round2(evaluation.score),
            learning_state: evaluation.state,
            confidence: round2(signals.confidence.clamp(0.0, 1.0)),
            eye_ratio: round2(signals.eye_ratio.max(0.0)),
            gaze_offset: [round2(signals.gaze.x), round2(signals.gaze.y)],
            is_sleeping: false,
            head_pose: HeadPose::default(),
            feedback: evaluation.feedback.clone(),
        }
    }

    /// Record for a frame without a usable face
    pub fn no_face() -> Self {
        Self {
            emotion: NO_FACE_LABEL.to_string(),
            score: 0.0,
            learning_state: LearningState::Unknown,
            confidence: 0.0,
            eye_ratio: 0.0,
            gaze_offset: [0.0, 0.0],
            is_sleeping: false,
            head_pose: HeadPose::default(),
            feedback: Feedback::none(),
        }
    }

    pub fn face_detected(&self) -> bool {
        self.learning_state != LearningState::Unknown
    }
}

/// Running session counters
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionStats {
    frames: u64,
    face_frames: u64,
    score_sum: f64,
    state_counts: BTreeMap<LearningState, u64>,
}

impl SessionStats {
    pub(crate) fn record(&mut self, analysis: &FrameAnalysis) {
        self.frames += 1;
        if analysis.face_detected() {
            self.face_frames += 1;
            self.score_sum += analysis.score;
        }
        *self.state_counts.entry(analysis.learning_state).or_insert(0) += 1;
    }

    pub(crate) fn summarize(&self, window: WindowStats) -> SessionSummary {
        let average_score = if self.face_frames == 0 {
            0.0
        } else {
            round2(self.score_sum / self.face_frames as f64)
        };
        // Ties go to the state that sorts first
        let dominant_state = self
            .state_counts
            .iter()
            .filter(|(state, _)| **state != LearningState::Unknown)
            .fold(None, |best: Option<(LearningState, u64)>, (&state, &n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((state, n)),
            })
            .map(|(state, _)| state);

        SessionSummary {
            frames: self.frames,
            face_frames: self.face_frames,
            no_face_frames: self.frames - self.face_frames,
            average_score,
            dominant_state,
            state_counts: self.state_counts.clone(),
            window,
        }
    }
}

/// Aggregate view of a learner's session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub face_frames: u64,
    pub no_face_frames: u64,
    /// Mean score over frames with a face (2 decimals)
    pub average_score: f64,
    /// Most frequent state other than `Unknown`
    pub dominant_state: Option<LearningState>,
    pub state_counts: BTreeMap<LearningState, u64>,
    /// Statistics over the sliding windows
    pub window: WindowStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackAction;
    use emotion_inference::Emotion;
    use face_features::GazeOffset;

    #[test]
    fn test_no_face_record() {
        let record = FrameAnalysis::no_face();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "emotion": "No face",
                "score": 0.0,
                "learning_state": "Unknown",
                "confidence": 0.0,
                "eye_ratio": 0.0,
                "gaze_offset": [0.0, 0.0],
                "is_sleeping": false,
                "head_pose": {"pitch": 0.0, "yaw": 0.0, "roll": 0.0},
                "feedback": {
                    "action": "none",
                    "message": "No face detected",
                    "resource": "",
                    "should_pause": false,
                },
            })
        );
    }

    #[test]
    fn test_fields_rounded_to_two_decimals() {
        let signals = FrameSignals {
            eye_ratio: 0.28751,
            gaze: GazeOffset::new(-0.0349, 0.1251),
            emotion: Emotion::Surprise,
            confidence: 0.8768,
        };
        let evaluation = Evaluation::new(3.456, LearningState::Frustrated);
        let record = FrameAnalysis::from_signals(&signals, &evaluation);
        assert_eq!(record.emotion, "surprise");
        assert_eq!(record.score, 3.46);
        assert_eq!(record.confidence, 0.88);
        assert_eq!(record.eye_ratio, 0.29);
        assert_eq!(record.gaze_offset, [-0.03, 0.13]);
        assert_eq!(record.feedback.action, FeedbackAction::Break);
        assert!(record.face_detected());
    }

    #[test]
    fn test_session_summary() {
        let mut stats = SessionStats::default();
        let signals = FrameSignals {
            eye_ratio: 0.3,
            gaze: GazeOffset::default(),
            emotion: Emotion::Neutral,
            confidence: 0.6,
        };
        let face = |score, state| FrameAnalysis::from_signals(&signals, &Evaluation::new(score, state));
        stats.record(&face(6.0, LearningState::Confused));
        stats.record(&face(8.0, LearningState::Engaged));
        stats.record(&face(9.0, LearningState::Engaged));
        stats.record(&FrameAnalysis::no_face());
        stats.record(&FrameAnalysis::no_face());
        stats.record(&FrameAnalysis::no_face());

        let summary = stats.summarize(WindowStats::default());
        assert_eq!(summary.frames, 6);
        assert_eq!(summary.face_frames, 3);
        assert_eq!(summary.no_face_frames, 3);
        assert_eq!(summary.average_score, 7.67);
        assert_eq!(summary.dominant_state, Some(LearningState::Engaged));
        assert_eq!(summary.state_counts[&LearningState::Unknown], 3);
    }

    #[test]
    fn test_empty_session_summary() {
        let summary = SessionStats::default().summarize(WindowStats::default());
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.average_score, 0.0);
        assert_eq!(summary.dominant_state, None);
    }
}
