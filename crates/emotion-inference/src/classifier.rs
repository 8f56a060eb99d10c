//! Emotion classifier capability and stub classifiers

use crate::emotion::EmotionPrediction;
use crate::EmotionError;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use video_frame::VideoFrame;

/// External emotion classifier.
///
/// Implementations may fail in any way; the adapter absorbs every failure.
pub trait EmotionClassifier: Send + Sync {
    fn classify(
        &self,
        frame: &VideoFrame,
    ) -> impl Future<Output = Result<EmotionPrediction, EmotionError>> + Send;
}

impl<C: EmotionClassifier> EmotionClassifier for Arc<C> {
    fn classify(
        &self,
        frame: &VideoFrame,
    ) -> impl Future<Output = Result<EmotionPrediction, EmotionError>> + Send {
        (**self).classify(frame)
    }
}

/// Classifier that returns the same prediction for every frame
#[derive(Debug, Clone)]
pub struct FixedEmotion {
    prediction: EmotionPrediction,
}

impl FixedEmotion {
    pub fn new(prediction: EmotionPrediction) -> Self {
        Self { prediction }
    }

    /// Dominant `label` with the given confidence
    pub fn label(label: &str, confidence: f64) -> Self {
        Self::new(EmotionPrediction::new(label).with_score(label, confidence))
    }
}

impl EmotionClassifier for FixedEmotion {
    fn classify(
        &self,
        _frame: &VideoFrame,
    ) -> impl Future<Output = Result<EmotionPrediction, EmotionError>> + Send {
        let prediction = self.prediction.clone();
        async move { Ok(prediction) }
    }
}

/// Classifier that replays a script of results, cycling when exhausted
#[derive(Debug)]
pub struct ScriptedEmotion {
    script: Vec<Result<EmotionPrediction, EmotionError>>,
    cursor: AtomicUsize,
}

impl ScriptedEmotion {
    pub fn new(script: Vec<Result<EmotionPrediction, EmotionError>>) -> Self {
        Self {
            script,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of classify calls so far
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl EmotionClassifier for ScriptedEmotion {
    fn classify(
        &self,
        _frame: &VideoFrame,
    ) -> impl Future<Output = Result<EmotionPrediction, EmotionError>> + Send {
        let step = self.cursor.fetch_add(1, Ordering::Relaxed);
        let result = if self.script.is_empty() {
            Err(EmotionError::EmptyResult)
        } else {
            self.script[step % self.script.len()].clone()
        };
        async move { result }
    }
}

/// Classifier that always fails, as when no model is installed
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEmotion;

impl EmotionClassifier for UnavailableEmotion {
    fn classify(
        &self,
        _frame: &VideoFrame,
    ) -> impl Future<Output = Result<EmotionPrediction, EmotionError>> + Send {
        async { Err(EmotionError::Unavailable) }
    }
}
