//! Time-bounded emotion adapter

use crate::classifier::EmotionClassifier;
use crate::emotion::EmotionReading;
use crate::EmotionError;
use std::time::Duration;
use tracing::{debug, warn};
use video_frame::VideoFrame;

/// Default classifier time budget
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Wraps an [`EmotionClassifier`] so that every call yields a reading
pub struct EmotionAdapter<C> {
    classifier: C,
    timeout: Duration,
}

impl<C: EmotionClassifier> EmotionAdapter<C> {
    pub fn new(classifier: C, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify `frame`, falling back to neutral on any failure or timeout
    pub async fn read(&self, frame: &VideoFrame) -> EmotionReading {
        match self.try_read(frame).await {
            Ok(reading) => reading,
            Err(EmotionError::Timeout(ms)) => {
                warn!("Emotion classifier exceeded {}ms, using fallback", ms);
                EmotionReading::fallback()
            }
            Err(e) => {
                debug!("Emotion classifier failed ({}), using fallback", e);
                EmotionReading::fallback()
            }
        }
    }

    /// Classify `frame`, surfacing the failure instead of falling back
    pub async fn try_read(&self, frame: &VideoFrame) -> Result<EmotionReading, EmotionError> {
        let prediction = tokio::time::timeout(self.timeout, self.classifier.classify(frame))
            .await
            .map_err(|_| EmotionError::Timeout(self.timeout.as_millis() as u64))??;
        EmotionReading::from_prediction(&prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{FixedEmotion, ScriptedEmotion, UnavailableEmotion};
    use crate::emotion::{Emotion, EmotionPrediction, FALLBACK_CONFIDENCE};
    use std::future::Future;
    use video_frame::PixelFormat;

    struct Stalled;

    impl EmotionClassifier for Stalled {
        fn classify(
            &self,
            _frame: &VideoFrame,
        ) -> impl Future<Output = Result<EmotionPrediction, EmotionError>> + Send {
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(EmotionPrediction::new("happy"))
            }
        }
    }

    fn frame() -> VideoFrame {
        VideoFrame::filled(4, 4, PixelFormat::Bgr24, 0, 0)
    }

    fn adapter<C: EmotionClassifier>(classifier: C) -> EmotionAdapter<C> {
        EmotionAdapter::new(classifier, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    #[tokio::test]
    async fn test_successful_reading() {
        let reading = adapter(FixedEmotion::label("happy", 0.9)).read(&frame()).await;
        assert_eq!(reading.emotion, Emotion::Happy);
        assert!((reading.confidence - 0.9).abs() < 1e-12);
        assert!(!reading.fallback);
    }

    #[tokio::test]
    async fn test_failures_fall_back_to_neutral() {
        let reading = adapter(UnavailableEmotion).read(&frame()).await;
        assert_eq!(reading, EmotionReading::fallback());
        assert_eq!(reading.confidence, FALLBACK_CONFIDENCE);

        let scripted = adapter(ScriptedEmotion::new(vec![
            Ok(EmotionPrediction::new("")),
            Ok(EmotionPrediction::new("bored")),
            Err(EmotionError::Inference("boom".into())),
            Ok(EmotionPrediction::new("angry")),
        ]));
        for _ in 0..3 {
            assert_eq!(scripted.read(&frame()).await, EmotionReading::fallback());
        }
        let reading = scripted.read(&frame()).await;
        assert_eq!(reading.emotion, Emotion::Angry);
        assert_eq!(reading.confidence, FALLBACK_CONFIDENCE);
        assert!(!reading.fallback);
        assert_eq!(scripted.classifier().calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let adapter = EmotionAdapter::new(Stalled, Duration::from_millis(250));
        assert_eq!(
            adapter.try_read(&frame()).await,
            Err(EmotionError::Timeout(250))
        );
        assert_eq!(adapter.read(&frame()).await, EmotionReading::fallback());
    }
}
