//! Feedback selection

use crate::state::LearningState;
use serde::{Deserialize, Serialize};

/// Suggested action for the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackAction {
    Break,
    Help,
    Reminder,
    Continue,
    None,
}

impl FeedbackAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackAction::Break => "break",
            FeedbackAction::Help => "help",
            FeedbackAction::Reminder => "reminder",
            FeedbackAction::Continue => "continue",
            FeedbackAction::None => "none",
        }
    }
}

/// User-facing suggestion paired with a learning state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub action: FeedbackAction,
    pub message: String,
    /// Resource path, empty when there is nothing to open
    pub resource: String,
    /// Reserved for escalation, currently always false
    pub should_pause: bool,
}

impl Feedback {
    fn new(action: FeedbackAction, message: &str, resource: &str) -> Self {
        Self {
            action,
            message: message.to_string(),
            resource: resource.to_string(),
            should_pause: false,
        }
    }

    /// Feedback for a learning state
    pub fn for_state(state: LearningState) -> Self {
        match state {
            LearningState::Frustrated => Self::new(
                FeedbackAction::Break,
                "It looks like you're frustrated. Want to take a short break?",
                "/breathing-exercise",
            ),
            LearningState::Confused => Self::new(
                FeedbackAction::Help,
                "Looks like you might be confused. Want a quick explanation?",
                "/video-explanation",
            ),
            LearningState::Tired => Self::new(
                FeedbackAction::Break,
                "You seem tired. Would you like to take a 2-minute break?",
                "/mini-break",
            ),
            LearningState::Distracted => Self::new(
                FeedbackAction::Reminder,
                "You seem distracted. Want to try a mini quiz?",
                "/mini-quiz",
            ),
            LearningState::Engaged => Self::new(
                FeedbackAction::Continue,
                "Great job staying focused!",
                "/next-topic",
            ),
            LearningState::Unknown => Self::none(),
        }
    }

    /// Feedback for a state label; unrecognized labels get the no-face entry
    pub fn for_label(label: &str) -> Self {
        label
            .parse::<LearningState>()
            .map_or_else(|_| Self::none(), Self::for_state)
    }

    /// Entry used when no face is in view
    pub fn none() -> Self {
        Self::new(FeedbackAction::None, "No face detected", "")
    }
}
