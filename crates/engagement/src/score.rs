//! Engagement score function

use emotion_inference::Emotion;
use face_features::GazeOffset;

/// Eye ratio at which the openness bonus starts
pub const EYE_OPEN_THRESH: f64 = 0.2;
/// Horizontal gaze bound for "looking forward"
pub const GAZE_FORWARD_THRESH_X: f64 = 0.1;
/// Vertical gaze bound for "looking forward"
pub const GAZE_FORWARD_THRESH_Y: f64 = 0.1;
/// Base weight for labels outside the emotion vocabulary
pub const UNKNOWN_EMOTION_WEIGHT: f64 = 0.5;
/// Upper bound of the score
pub const MAX_SCORE: f64 = 10.0;

const FORWARD_GAZE_BONUS: f64 = 1.0;
const AVERTED_GAZE_PENALTY: f64 = -0.5;

/// Base weight of an emotion
pub fn emotion_weight(emotion: Emotion) -> f64 {
    match emotion {
        Emotion::Neutral => 1.0,
        Emotion::Happy => 1.2,
        Emotion::Surprise => 0.8,
        Emotion::Angry | Emotion::Fear => 0.3,
        Emotion::Sad | Emotion::Disgust => 0.2,
    }
}

/// Base weight of a raw label, [`UNKNOWN_EMOTION_WEIGHT`] when unrecognized
pub fn label_weight(label: &str) -> f64 {
    label
        .parse::<Emotion>()
        .map_or(UNKNOWN_EMOTION_WEIGHT, emotion_weight)
}

/// Engagement score in [0, 10], rounded to 2 decimals
pub fn calculate_score(emotion: Emotion, eye_ratio: f64, gaze: GazeOffset) -> f64 {
    score_from_weight(emotion_weight(emotion), eye_ratio, gaze)
}

/// [`calculate_score`] for a raw classifier label
pub fn calculate_score_for_label(label: &str, eye_ratio: f64, gaze: GazeOffset) -> f64 {
    score_from_weight(label_weight(label), eye_ratio, gaze)
}

fn score_from_weight(weight: f64, eye_ratio: f64, gaze: GazeOffset) -> f64 {
    let eye_ratio = if eye_ratio.is_finite() { eye_ratio } else { 0.0 };
    let openness_bonus = ((eye_ratio - EYE_OPEN_THRESH) * 2.0).clamp(0.0, 1.0);

    let looking_forward =
        gaze.x.abs() < GAZE_FORWARD_THRESH_X && gaze.y.abs() < GAZE_FORWARD_THRESH_Y;
    let gaze_term = if looking_forward {
        FORWARD_GAZE_BONUS
    } else {
        AVERTED_GAZE_PENALTY
    };

    round2(((weight + openness_bonus + gaze_term) * 2.0).clamp(0.0, MAX_SCORE))
}

/// Round to 2 decimals, mapping non-finite values to 0
pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FORWARD: GazeOffset = GazeOffset::new(0.0, 0.0);

    #[test]
    fn test_happy_forward_open_eyes() {
        // (1.2 + 0.2 + 1.0) * 2
        assert_eq!(calculate_score(Emotion::Happy, 0.3, FORWARD), 4.8);
    }

    #[test]
    fn test_full_openness_bonus_caps_at_one() {
        assert_eq!(calculate_score(Emotion::Neutral, 0.9, FORWARD), 6.0);
        assert_eq!(calculate_score(Emotion::Neutral, 0.7, FORWARD), 6.0);
    }

    #[test]
    fn test_averted_gaze_penalty() {
        // (1.0 + 0.0 - 0.5) * 2
        assert_eq!(calculate_score(Emotion::Neutral, 0.1, GazeOffset::new(0.1, 0.0)), 1.0);
        assert_eq!(calculate_score(Emotion::Neutral, 0.1, GazeOffset::new(0.0, -0.25)), 1.0);
        // (0.2 + 0 - 0.5) * 2 clamps to 0
        assert_eq!(calculate_score(Emotion::Sad, 0.0, GazeOffset::new(0.5, 0.5)), 0.0);
    }

    #[test]
    fn test_unknown_label_weight() {
        assert_eq!(label_weight("contempt"), UNKNOWN_EMOTION_WEIGHT);
        assert_eq!(label_weight("surprise"), 0.8);
        // (0.5 + 0 + 1.0) * 2
        assert_eq!(calculate_score_for_label("contempt", 0.2, FORWARD), 3.0);
        assert_eq!(
            calculate_score_for_label("happy", 0.3, FORWARD),
            calculate_score(Emotion::Happy, 0.3, FORWARD)
        );
    }

    #[test]
    fn test_non_finite_inputs_stay_in_bounds() {
        let score = calculate_score(Emotion::Happy, f64::NAN, GazeOffset::new(f64::NAN, 0.0));
        assert!((0.0..=MAX_SCORE).contains(&score));
        let score = calculate_score(Emotion::Happy, f64::INFINITY, FORWARD);
        assert!((0.0..=MAX_SCORE).contains(&score));
        assert_eq!(round2(f64::NAN), 0.0);
    }

    fn any_emotion() -> impl Strategy<Value = Emotion> {
        proptest::sample::select(Emotion::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(
            emotion in any_emotion(),
            eye_ratio in -1e6f64..1e6,
            gx in -1e3f64..1e3,
            gy in -1e3f64..1e3,
        ) {
            let score = calculate_score(emotion, eye_ratio, GazeOffset::new(gx, gy));
            prop_assert!((0.0..=MAX_SCORE).contains(&score));
        }

        #[test]
        fn prop_score_monotone_in_eye_ratio(
            emotion in any_emotion(),
            a in -2.0f64..2.0,
            b in -2.0f64..2.0,
            gx in -0.3f64..0.3,
            gy in -0.3f64..0.3,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let gaze = GazeOffset::new(gx, gy);
            prop_assert!(calculate_score(emotion, lo, gaze) <= calculate_score(emotion, hi, gaze));
        }

        #[test]
        fn prop_score_is_deterministic(
            emotion in any_emotion(),
            eye_ratio in 0.0f64..1.0,
            gx in -0.3f64..0.3,
            gy in -0.3f64..0.3,
        ) {
            let gaze = GazeOffset::new(gx, gy);
            prop_assert_eq!(
                calculate_score(emotion, eye_ratio, gaze).to_bits(),
                calculate_score(emotion, eye_ratio, gaze).to_bits()
            );
        }
    }
}
