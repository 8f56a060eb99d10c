//! Eye openness and gaze offset from landmark geometry

use crate::landmarks::{
    EyeLandmarks, FaceMesh, IrisLandmarks, Point2, LEFT_EYE, LEFT_IRIS, RIGHT_EYE, RIGHT_IRIS,
};
use crate::FeatureError;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How the summed iris displacement is scaled into a gaze offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeNormalization {
    /// Divide each axis by twice the left eye center coordinate on that axis
    #[default]
    LeftEyeCenter,
    /// Divide each axis by the sum of both eye center coordinates on that axis
    Symmetric,
}

/// Signed gaze deviation, 0 = looking straight ahead
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GazeOffset {
    pub x: f64,
    pub y: f64,
}

impl GazeOffset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Per-frame geometric signals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameFeatures {
    /// Mean of left and right eye openness ratios
    pub eye_ratio: f64,
    pub left_eye_ratio: f64,
    pub right_eye_ratio: f64,
    pub gaze: GazeOffset,
}

/// Eye openness ratio: vertical span over horizontal span.
///
/// Returns 0 when the horizontal span is zero or the geometry is not finite.
pub fn eye_openness_ratio(eye: &EyeLandmarks) -> f64 {
    let vertical = eye[1].distance(&eye[5]);
    let horizontal = eye[0].distance(&eye[3]);
    if horizontal == 0.0 {
        return 0.0;
    }
    finite_or_zero(vertical / horizontal)
}

/// Gaze offset from both eyes' contour and iris points
pub fn gaze_offset(
    left_eye: &EyeLandmarks,
    right_eye: &EyeLandmarks,
    left_iris: &IrisLandmarks,
    right_iris: &IrisLandmarks,
    normalization: GazeNormalization,
) -> GazeOffset {
    let le = Point2::centroid(left_eye);
    let re = Point2::centroid(right_eye);
    let li = Point2::centroid(left_iris);
    let ri = Point2::centroid(right_iris);

    let dx = (li.x - le.x) + (ri.x - re.x);
    let dy = (li.y - le.y) + (ri.y - re.y);

    let (scale_x, scale_y) = match normalization {
        GazeNormalization::LeftEyeCenter => (le.x * 2.0, le.y * 2.0),
        GazeNormalization::Symmetric => (le.x + re.x, le.y + re.y),
    };

    GazeOffset::new(scaled(dx, scale_x), scaled(dy, scale_y))
}

fn scaled(delta: f64, scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    finite_or_zero(delta / scale)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Extracts [`FrameFeatures`] from a face mesh
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    normalization: GazeNormalization,
}

impl FeatureExtractor {
    pub fn new(normalization: GazeNormalization) -> Self {
        Self { normalization }
    }

    pub fn normalization(&self) -> GazeNormalization {
        self.normalization
    }

    /// Compute eye ratios and gaze offset.
    ///
    /// Fails only when the mesh lacks one of the required landmarks.
    pub fn extract(&self, mesh: &FaceMesh) -> Result<FrameFeatures, FeatureError> {
        let left_eye = mesh.select(&LEFT_EYE)?;
        let right_eye = mesh.select(&RIGHT_EYE)?;
        let left_iris = mesh.select(&LEFT_IRIS)?;
        let right_iris = mesh.select(&RIGHT_IRIS)?;

        let left_eye_ratio = eye_openness_ratio(&left_eye);
        let right_eye_ratio = eye_openness_ratio(&right_eye);
        let gaze = gaze_offset(
            &left_eye,
            &right_eye,
            &left_iris,
            &right_iris,
            self.normalization,
        );

        let features = FrameFeatures {
            eye_ratio: (left_eye_ratio + right_eye_ratio) / 2.0,
            left_eye_ratio,
            right_eye_ratio,
            gaze,
        };
        trace!(?features, "Extracted frame features");
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Eye whose corners sit `width` apart and whose lid pair sits `height` apart
    fn eye_at(cx: f64, cy: f64, width: f64, height: f64) -> EyeLandmarks {
        [
            Point2::new(cx - width / 2.0, cy),
            Point2::new(cx, cy - height / 2.0),
            Point2::new(cx - width / 4.0, cy - height / 4.0),
            Point2::new(cx + width / 2.0, cy),
            Point2::new(cx + width / 4.0, cy + height / 4.0),
            Point2::new(cx, cy + height / 2.0),
        ]
    }

    fn iris_at(cx: f64, cy: f64) -> IrisLandmarks {
        [
            Point2::new(cx - 1.0, cy),
            Point2::new(cx, cy - 1.0),
            Point2::new(cx + 1.0, cy),
            Point2::new(cx, cy + 1.0),
        ]
    }

    #[test]
    fn test_eye_ratio() {
        let eye = eye_at(100.0, 100.0, 40.0, 12.0);
        assert!((eye_openness_ratio(&eye) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_zero_width_eye_is_zero() {
        let eye = [Point2::new(5.0, 5.0); 6];
        assert_eq!(eye_openness_ratio(&eye), 0.0);

        let mut eye = eye_at(10.0, 10.0, 0.0, 8.0);
        eye[0] = eye[3];
        assert_eq!(eye_openness_ratio(&eye), 0.0);
    }

    #[test]
    fn test_non_finite_geometry_is_zero() {
        let mut eye = eye_at(10.0, 10.0, 4.0, 2.0);
        eye[1] = Point2::new(f64::NAN, 0.0);
        assert_eq!(eye_openness_ratio(&eye), 0.0);
    }

    #[test]
    fn test_centered_iris_has_no_gaze_offset() {
        let le = eye_at(200.0, 150.0, 40.0, 12.0);
        let re = eye_at(300.0, 150.0, 40.0, 12.0);
        let gaze = gaze_offset(
            &le,
            &re,
            &iris_at(200.0, 150.0),
            &iris_at(300.0, 150.0),
            GazeNormalization::LeftEyeCenter,
        );
        assert!(gaze.x.abs() < 1e-12 && gaze.y.abs() < 1e-12);
    }

    #[test]
    fn test_gaze_normalization_modes() {
        let le = eye_at(100.0, 50.0, 40.0, 12.0);
        let re = eye_at(300.0, 50.0, 40.0, 12.0);
        let li = iris_at(110.0, 55.0);
        let ri = iris_at(310.0, 55.0);

        // Summed displacement is (20, 10)
        let left = gaze_offset(&le, &re, &li, &ri, GazeNormalization::LeftEyeCenter);
        assert!((left.x - 20.0 / 200.0).abs() < 1e-12);
        assert!((left.y - 10.0 / 100.0).abs() < 1e-12);

        let sym = gaze_offset(&le, &re, &li, &ri, GazeNormalization::Symmetric);
        assert!((sym.x - 20.0 / 400.0).abs() < 1e-12);
        assert!((sym.y - 10.0 / 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_gaze_with_eye_on_origin_axis_is_finite() {
        let le = eye_at(0.0, 0.0, 0.0, 0.0);
        let re = eye_at(0.0, 0.0, 0.0, 0.0);
        let gaze = gaze_offset(
            &le,
            &re,
            &iris_at(3.0, 3.0),
            &iris_at(3.0, 3.0),
            GazeNormalization::LeftEyeCenter,
        );
        assert_eq!(gaze, GazeOffset::default());
    }

    #[test]
    fn test_extract_from_mesh() {
        let mut points = vec![Point2::default(); 478];
        for (&i, p) in LEFT_EYE.iter().zip(eye_at(200.0, 150.0, 40.0, 8.0)) {
            points[i] = p;
        }
        for (&i, p) in RIGHT_EYE.iter().zip(eye_at(300.0, 150.0, 40.0, 16.0)) {
            points[i] = p;
        }
        for (&i, p) in LEFT_IRIS.iter().zip(iris_at(200.0, 150.0)) {
            points[i] = p;
        }
        for (&i, p) in RIGHT_IRIS.iter().zip(iris_at(300.0, 150.0)) {
            points[i] = p;
        }

        let features = FeatureExtractor::default()
            .extract(&FaceMesh::new(points))
            .unwrap();
        assert!((features.left_eye_ratio - 0.2).abs() < 1e-12);
        assert!((features.right_eye_ratio - 0.4).abs() < 1e-12);
        assert!((features.eye_ratio - 0.3).abs() < 1e-12);
        assert!(features.gaze.magnitude() < 1e-12);
    }

    #[test]
    fn test_extract_partial_mesh_fails() {
        let mesh = FaceMesh::new(vec![Point2::new(1.0, 1.0); 468]);
        assert!(matches!(
            FeatureExtractor::default().extract(&mesh),
            Err(FeatureError::MissingLandmark { index: 468, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_ratio_is_vertical_over_horizontal(
            coords in proptest::array::uniform12(-500.0f64..500.0),
        ) {
            let eye: EyeLandmarks = [
                Point2::new(coords[0], coords[1]),
                Point2::new(coords[2], coords[3]),
                Point2::new(coords[4], coords[5]),
                Point2::new(coords[6], coords[7]),
                Point2::new(coords[8], coords[9]),
                Point2::new(coords[10], coords[11]),
            ];
            let horizontal = eye[0].distance(&eye[3]);
            let ratio = eye_openness_ratio(&eye);
            if horizontal == 0.0 {
                prop_assert_eq!(ratio, 0.0);
            } else {
                prop_assert_eq!(ratio, eye[1].distance(&eye[5]) / horizontal);
            }
        }

        #[test]
        fn prop_gaze_is_always_finite(
            coords in proptest::collection::vec(-1000.0f64..1000.0, 40),
        ) {
            let pt = |i: usize| Point2::new(coords[2 * i], coords[2 * i + 1]);
            let le = [pt(0), pt(1), pt(2), pt(3), pt(4), pt(5)];
            let re = [pt(6), pt(7), pt(8), pt(9), pt(10), pt(11)];
            let li = [pt(12), pt(13), pt(14), pt(15)];
            let ri = [pt(16), pt(17), pt(18), pt(19)];
            for mode in [GazeNormalization::LeftEyeCenter, GazeNormalization::Symmetric] {
                let gaze = gaze_offset(&le, &re, &li, &ri, mode);
                prop_assert!(gaze.x.is_finite() && gaze.y.is_finite());
            }
        }
    }
}
