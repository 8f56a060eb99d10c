//! Emotion Inference
//!
//! The emotion classifier is an injected capability. [`EmotionAdapter`] wraps
//! one with a time bound and maps every failure onto the neutral fallback, so
//! callers always receive a reading.

mod adapter;
mod classifier;
mod emotion;
#[cfg(feature = "onnx")]
mod onnx;

pub use adapter::{EmotionAdapter, DEFAULT_TIMEOUT_MS};
pub use classifier::{EmotionClassifier, FixedEmotion, ScriptedEmotion, UnavailableEmotion};
pub use emotion::{Emotion, EmotionPrediction, EmotionReading, FALLBACK_CONFIDENCE};
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmotionClassifier;

use thiserror::Error;

/// Errors raised by emotion classifiers
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmotionError {
    #[error("Model load failed: {0}")]
    ModelLoad(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Classifier returned no result")]
    EmptyResult,
    #[error("Unrecognized emotion label: {0}")]
    UnknownLabel(String),
    #[error("Classifier unavailable")]
    Unavailable,
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),
}
