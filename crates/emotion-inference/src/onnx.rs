//! ONNX Runtime emotion classifier

use crate::classifier::EmotionClassifier;
use crate::emotion::{Emotion, EmotionPrediction};
use crate::EmotionError;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use video_frame::VideoFrame;

/// Input side length of FER-style models
const INPUT_SIZE: u32 = 48;

/// Output order of FER-style models
const OUTPUT_LABELS: [Emotion; 7] = [
    Emotion::Angry,
    Emotion::Disgust,
    Emotion::Fear,
    Emotion::Happy,
    Emotion::Sad,
    Emotion::Surprise,
    Emotion::Neutral,
];

/// Emotion classifier for a 48x48 grayscale NHWC model with seven outputs.
///
/// Expects a frame cropped to the face; the whole frame is resized as is.
pub struct OnnxEmotionClassifier {
    session: Arc<Session>,
}

impl OnnxEmotionClassifier {
    /// Load the model at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EmotionError> {
        let path = path.as_ref();
        info!("Loading emotion model from {}", path.display());

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                error!("Failed to load emotion model: {}", e);
                EmotionError::ModelLoad(e.to_string())
            })?;

        Ok(Self {
            session: Arc::new(session),
        })
    }

    fn preprocess(frame: &VideoFrame) -> Array4<f32> {
        let gray = frame.to_grayscale_square(INPUT_SIZE);
        let mut input = Array4::<f32>::zeros((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 1));
        for (x, y, pixel) in gray.enumerate_pixels() {
            input[[0, y as usize, x as usize, 0]] = pixel[0] as f32 / 255.0;
        }
        input
    }

    fn run(session: &Session, input: Array4<f32>) -> Result<Vec<f32>, EmotionError> {
        let inputs = ort::inputs![input].map_err(|e| EmotionError::Inference(e.to_string()))?;
        let outputs = session
            .run(inputs)
            .map_err(|e| EmotionError::Inference(e.to_string()))?;
        let probs = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmotionError::Inference(e.to_string()))?;
        Ok(probs.iter().copied().collect())
    }
}

/// Softmax unless the values already form a distribution
fn to_distribution(raw: &[f32]) -> Vec<f64> {
    let is_distribution = raw.iter().all(|v| (0.0..=1.0).contains(v))
        && (raw.iter().sum::<f32>() - 1.0).abs() < 1e-3;
    if is_distribution {
        return raw.iter().map(|&v| v as f64).collect();
    }
    let max = raw.iter().copied().fold(f32::MIN, f32::max);
    let exps: Vec<f64> = raw.iter().map(|&v| ((v - max) as f64).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(
        &self,
        frame: &VideoFrame,
    ) -> impl Future<Output = Result<EmotionPrediction, EmotionError>> + Send {
        let input = Self::preprocess(frame);
        let session = Arc::clone(&self.session);
        async move {
            let raw = tokio::task::spawn_blocking(move || Self::run(&session, input))
                .await
                .map_err(|e| EmotionError::Inference(e.to_string()))??;

            if raw.len() != OUTPUT_LABELS.len() {
                return Err(EmotionError::Inference(format!(
                    "expected {} outputs, got {}",
                    OUTPUT_LABELS.len(),
                    raw.len()
                )));
            }

            let probs = to_distribution(&raw);
            debug!(?probs, "Emotion model output");
            Ok(EmotionPrediction::from_scores(
                OUTPUT_LABELS.iter().map(|e| e.as_str()).zip(probs),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_passthrough_and_softmax() {
        let probs = to_distribution(&[0.1, 0.2, 0.7]);
        assert!((probs[2] - 0.7).abs() < 1e-6);

        let probs = to_distribution(&[2.0, 0.0, -1.0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn test_missing_model_is_load_error() {
        let result = OnnxEmotionClassifier::load("/nonexistent/emotion.onnx");
        assert!(matches!(result, Err(EmotionError::ModelLoad(_))));
    }
}
