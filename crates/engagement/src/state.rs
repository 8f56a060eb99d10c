//! Learning state classification

use crate::EngagementError;
use emotion_inference::Emotion;
use face_features::GazeOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gaze deviation (either axis) above which the learner counts as distracted.
/// Distinct from the score function's forward-gaze bounds.
pub const DISTRACTION_GAZE_THRESH: f64 = 0.15;
/// Eye ratio below which the learner counts as tired.
/// Distinct from the score function's openness threshold.
pub const TIRED_EYE_RATIO_THRESH: f64 = 0.18;
/// Score at or above which the learner is engaged
pub const ENGAGED_SCORE: f64 = 7.0;
/// Lower bound of the ambiguous middle band
pub const MID_BAND_SCORE: f64 = 4.0;
/// Lower bound of the frustrated band
pub const LOW_BAND_SCORE: f64 = 2.0;

/// Discrete engagement classification for one frame
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum LearningState {
    Engaged,
    Distracted,
    Tired,
    Confused,
    Frustrated,
    /// No face in view
    #[default]
    Unknown,
}

impl LearningState {
    pub const ALL: [LearningState; 6] = [
        LearningState::Engaged,
        LearningState::Distracted,
        LearningState::Tired,
        LearningState::Confused,
        LearningState::Frustrated,
        LearningState::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningState::Engaged => "Engaged",
            LearningState::Distracted => "Distracted",
            LearningState::Tired => "Tired",
            LearningState::Confused => "Confused",
            LearningState::Frustrated => "Frustrated",
            LearningState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LearningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningState {
    type Err = EngagementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        LearningState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| EngagementError::UnknownState(label.to_string()))
    }
}

/// Whether the gaze is far enough off-center to count as distraction
pub fn is_distracted(gaze: GazeOffset) -> bool {
    gaze.x.abs() > DISTRACTION_GAZE_THRESH || gaze.y.abs() > DISTRACTION_GAZE_THRESH
}

/// Whether the eyes are narrow enough to count as tiredness
pub fn is_tired(eye_ratio: f64) -> bool {
    eye_ratio < TIRED_EYE_RATIO_THRESH
}

/// Map one frame's signals to a learning state.
///
/// Rules are checked in order and the first match wins:
/// 1. negative emotion is `Frustrated`
/// 2. neutral or surprised with averted gaze is `Distracted`
/// 3. happy with score above 7 is `Engaged`
/// 4. score of 7 or more is `Engaged`
/// 5. score in [4, 7) is `Distracted`, `Tired` or `Confused` in that order
/// 6. score in [2, 4) is `Frustrated`
/// 7. anything lower is `Tired`
pub fn classify_learning_state(
    score: f64,
    eye_ratio: f64,
    gaze: GazeOffset,
    emotion: Emotion,
) -> LearningState {
    let distracted = is_distracted(gaze);

    if emotion.is_negative() {
        return LearningState::Frustrated;
    }
    if matches!(emotion, Emotion::Neutral | Emotion::Surprise) && distracted {
        return LearningState::Distracted;
    }
    if emotion == Emotion::Happy && score > ENGAGED_SCORE {
        return LearningState::Engaged;
    }

    if score >= ENGAGED_SCORE {
        LearningState::Engaged
    } else if score >= MID_BAND_SCORE {
        if distracted {
            LearningState::Distracted
        } else if is_tired(eye_ratio) {
            LearningState::Tired
        } else {
            LearningState::Confused
        }
    } else if score >= LOW_BAND_SCORE {
        LearningState::Frustrated
    } else {
        LearningState::Tired
    }
}
