//! Sliding signal history

use crate::config::HistoryConfig;
use crate::signals::FrameSignals;
use emotion_inference::Emotion;
use face_features::{GazeOffset, StatisticalFeatures};
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};

/// Bounded per-signal windows, appended once per frame with a face
#[derive(Debug, Clone, Serialize)]
pub struct SlidingHistory {
    emotions: RingBuffer<Emotion>,
    scores: RingBuffer<f64>,
    gaze: RingBuffer<GazeOffset>,
    eye_ratios: RingBuffer<f64>,
}

/// Aggregates over the current windows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub score: StatisticalFeatures,
    pub eye_ratio: StatisticalFeatures,
    pub mean_gaze_magnitude: f64,
    /// Most frequent emotion, earliest wins on ties
    pub dominant_emotion: Option<Emotion>,
}

impl SlidingHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            emotions: RingBuffer::new(config.emotions),
            scores: RingBuffer::new(config.scores),
            gaze: RingBuffer::new(config.gaze),
            eye_ratios: RingBuffer::new(config.eye_ratios),
        }
    }

    /// Append one analyzed frame
    pub fn record(&mut self, signals: &FrameSignals, score: f64) {
        self.eye_ratios.push(signals.eye_ratio);
        self.gaze.push(signals.gaze);
        self.emotions.push(signals.emotion);
        self.scores.push(score);
    }

    pub fn emotions(&self) -> &RingBuffer<Emotion> {
        &self.emotions
    }

    pub fn scores(&self) -> &RingBuffer<f64> {
        &self.scores
    }

    pub fn gaze(&self) -> &RingBuffer<GazeOffset> {
        &self.gaze
    }

    pub fn eye_ratios(&self) -> &RingBuffer<f64> {
        &self.eye_ratios
    }

    pub fn clear(&mut self) {
        self.emotions.clear();
        self.scores.clear();
        self.gaze.clear();
        self.eye_ratios.clear();
    }

    pub fn stats(&self) -> WindowStats {
        let gaze_count = self.gaze.len();
        let mean_gaze_magnitude = if gaze_count == 0 {
            0.0
        } else {
            self.gaze.iter().map(GazeOffset::magnitude).sum::<f64>() / gaze_count as f64
        };

        WindowStats {
            score: StatisticalFeatures::compute(self.scores.iter().copied()),
            eye_ratio: StatisticalFeatures::compute(self.eye_ratios.iter().copied()),
            mean_gaze_magnitude,
            dominant_emotion: self.dominant_emotion(),
        }
    }

    fn dominant_emotion(&self) -> Option<Emotion> {
        let mut counts: Vec<(Emotion, usize)> = Vec::new();
        for &emotion in &self.emotions {
            match counts.iter_mut().find(|(e, _)| *e == emotion) {
                Some((_, n)) => *n += 1,
                None => counts.push((emotion, 1)),
            }
        }
        // max_by_key keeps the last maximum, so scan in reverse to favor the earliest
        counts
            .into_iter()
            .rev()
            .max_by_key(|&(_, n)| n)
            .map(|(e, _)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(emotion: Emotion, eye_ratio: f64) -> FrameSignals {
        FrameSignals {
            eye_ratio,
            gaze: GazeOffset::new(0.03, 0.04),
            emotion,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_windows_respect_capacities() {
        let mut history = SlidingHistory::new(&HistoryConfig::default());
        for i in 0..100 {
            history.record(&signals(Emotion::Neutral, 0.3), i as f64 / 10.0);
        }
        assert_eq!(history.emotions().len(), 15);
        assert_eq!(history.scores().len(), 15);
        assert_eq!(history.gaze().len(), 15);
        assert_eq!(history.eye_ratios().len(), 60);
        assert_eq!(history.scores().latest(), Some(&9.9));
        assert_eq!(history.scores().oldest(), Some(&8.5));
    }

    #[test]
    fn test_stats() {
        let mut history = SlidingHistory::new(&HistoryConfig::default());
        history.record(&signals(Emotion::Happy, 0.2), 4.0);
        history.record(&signals(Emotion::Sad, 0.4), 6.0);
        history.record(&signals(Emotion::Sad, 0.3), 8.0);

        let stats = history.stats();
        assert!((stats.score.mean - 6.0).abs() < 1e-12);
        assert!((stats.eye_ratio.mean - 0.3).abs() < 1e-12);
        assert!((stats.mean_gaze_magnitude - 0.05).abs() < 1e-12);
        assert_eq!(stats.dominant_emotion, Some(Emotion::Sad));
    }

    #[test]
    fn test_dominant_emotion_tie_prefers_earliest() {
        let mut history = SlidingHistory::new(&HistoryConfig::default());
        assert_eq!(history.stats().dominant_emotion, None);
        for emotion in [Emotion::Surprise, Emotion::Happy, Emotion::Happy, Emotion::Surprise] {
            history.record(&signals(emotion, 0.3), 5.0);
        }
        assert_eq!(history.stats().dominant_emotion, Some(Emotion::Surprise));

        history.clear();
        assert!(history.scores().is_empty());
        assert_eq!(history.stats(), WindowStats::default());
    }
}
