//! Per-frame signals and the score, classify, feedback chain

use crate::feedback::Feedback;
use crate::score::calculate_score;
use crate::state::{classify_learning_state, LearningState};
use emotion_inference::Emotion;
use face_features::GazeOffset;
use serde::{Deserialize, Serialize};

/// Snapshot of one frame's signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSignals {
    /// Mean eye openness ratio, 0 for degenerate geometry
    pub eye_ratio: f64,
    pub gaze: GazeOffset,
    pub emotion: Emotion,
    /// Confidence of `emotion`, in [0, 1]
    pub confidence: f64,
}

/// Result of scoring and classifying one [`FrameSignals`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: f64,
    pub state: LearningState,
    pub feedback: Feedback,
}

impl Evaluation {
    pub fn new(score: f64, state: LearningState) -> Self {
        Self {
            score,
            state,
            feedback: Feedback::for_state(state),
        }
    }

    /// Replace the state; feedback follows it
    pub fn override_state(&mut self, state: LearningState) {
        if self.state != state {
            self.state = state;
            self.feedback = Feedback::for_state(state);
        }
    }
}

/// Score, classify and pick feedback for `signals`. Uses no history.
pub fn evaluate(signals: &FrameSignals) -> Evaluation {
    let score = calculate_score(signals.emotion, signals.eye_ratio, signals.gaze);
    let state = classify_learning_state(score, signals.eye_ratio, signals.gaze, signals.emotion);
    Evaluation::new(score, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackAction;

    #[test]
    fn test_happy_lands_in_confused_band() {
        let evaluation = evaluate(&FrameSignals {
            eye_ratio: 0.3,
            gaze: GazeOffset::new(0.0, 0.0),
            emotion: Emotion::Happy,
            confidence: 0.9,
        });
        assert_eq!(evaluation.score, 4.8);
        assert_eq!(evaluation.state, LearningState::Confused);
        assert_eq!(evaluation.feedback.action, FeedbackAction::Help);
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let signals = FrameSignals {
            eye_ratio: 0.23,
            gaze: GazeOffset::new(0.07, -0.02),
            emotion: Emotion::Surprise,
            confidence: 0.55,
        };
        let first = evaluate(&signals);
        let second = evaluate(&signals);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_override_keeps_feedback_in_step() {
        let mut evaluation = evaluate(&FrameSignals {
            eye_ratio: 0.5,
            gaze: GazeOffset::default(),
            emotion: Emotion::Happy,
            confidence: 0.9,
        });
        assert_eq!(evaluation.state, LearningState::Confused);

        evaluation.override_state(LearningState::Tired);
        assert_eq!(evaluation.state, LearningState::Tired);
        assert_eq!(evaluation.feedback, Feedback::for_state(LearningState::Tired));
        assert_eq!(evaluation.feedback.action, FeedbackAction::Break);
        assert!((evaluation.score - 5.6).abs() < 1e-9);
    }
}
