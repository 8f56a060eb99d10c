//! Emotion vocabulary and classifier outputs

use crate::EmotionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Confidence reported when the classifier gives none
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Fixed emotion vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Surprise,
    Angry,
    Fear,
    Sad,
    Disgust,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Surprise,
        Emotion::Angry,
        Emotion::Fear,
        Emotion::Sad,
        Emotion::Disgust,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Surprise => "surprise",
            Emotion::Angry => "angry",
            Emotion::Fear => "fear",
            Emotion::Sad => "sad",
            Emotion::Disgust => "disgust",
        }
    }

    /// Negative-valence emotions
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Emotion::Sad | Emotion::Fear | Emotion::Angry | Emotion::Disgust
        )
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = EmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| EmotionError::UnknownLabel(label.to_string()))
    }
}

/// Raw classifier output: dominant label plus per-label confidence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionPrediction {
    pub dominant: String,
    pub scores: HashMap<String, f64>,
}

impl EmotionPrediction {
    pub fn new(dominant: impl Into<String>) -> Self {
        Self {
            dominant: dominant.into(),
            scores: HashMap::new(),
        }
    }

    pub fn with_score(mut self, label: impl Into<String>, score: f64) -> Self {
        self.scores.insert(label.into(), score);
        self
    }

    /// Prediction whose dominant label is the highest-scoring entry
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let scores: HashMap<String, f64> =
            scores.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let dominant = scores
            .iter()
            .filter(|(_, v)| v.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k.clone())
            .unwrap_or_default();
        Self { dominant, scores }
    }
}

/// Normalized emotion signal for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    pub emotion: Emotion,
    /// Confidence of the dominant label, in [0, 1]
    pub confidence: f64,
    /// Whether the reading is the fallback rather than a classifier result
    pub fallback: bool,
}

impl EmotionReading {
    /// Reading used whenever the classifier cannot answer
    pub fn fallback() -> Self {
        Self {
            emotion: Emotion::Neutral,
            confidence: FALLBACK_CONFIDENCE,
            fallback: true,
        }
    }

    /// Validate and normalize a raw prediction.
    ///
    /// Scores above 1 are read as percentages. A dominant label missing from
    /// the score map gets [`FALLBACK_CONFIDENCE`].
    pub fn from_prediction(prediction: &EmotionPrediction) -> Result<Self, EmotionError> {
        if prediction.dominant.trim().is_empty() {
            return Err(EmotionError::EmptyResult);
        }
        let emotion: Emotion = prediction.dominant.parse()?;

        let raw = prediction
            .scores
            .iter()
            .find(|(label, _)| label.parse::<Emotion>().ok() == Some(emotion))
            .map(|(_, &score)| score);

        Ok(Self {
            emotion,
            confidence: raw.map_or(FALLBACK_CONFIDENCE, normalize_confidence),
            fallback: false,
        })
    }
}

const PROBABILITY_EPSILON: f64 = 1e-6;

fn normalize_confidence(raw: f64) -> f64 {
    if !raw.is_finite() {
        return FALLBACK_CONFIDENCE;
    }
    // Overshoot within epsilon is float error on a probability, not a percent
    let scaled = if raw > 1.0 + PROBABILITY_EPSILON {
        raw / 100.0
    } else {
        raw
    };
    scaled.clamp(0.0, 1.0)
}
