//! Facial Feature Engine
//!
//! Turns a face-geometry detection into the per-frame signals the engagement
//! engine consumes:
//! - Eye openness ratio (vertical / horizontal lid distance)
//! - Gaze offset (iris center displacement from eye center)
//! - Summary statistics over signal windows

mod detector;
mod geometry;
mod landmarks;
mod statistics;

pub use detector::{FaceMeshDetector, FixedFaceMesh, NoFaceDetector};
pub use geometry::{
    eye_openness_ratio, gaze_offset, FeatureExtractor, FrameFeatures, GazeNormalization,
    GazeOffset,
};
pub use landmarks::{
    EyeLandmarks, FaceMesh, FaceRegion, IrisLandmarks, Point2, LEFT_EYE, LEFT_IRIS,
    MIN_MESH_POINTS, RIGHT_EYE, RIGHT_IRIS,
};
pub use statistics::StatisticalFeatures;

use thiserror::Error;

/// Feature extraction error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Landmark {index} missing: mesh has {available} points")]
    MissingLandmark { index: usize, available: usize },

    #[error("Face detector failed: {0}")]
    Detector(String),
}
