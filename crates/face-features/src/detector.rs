//! Face-geometry detector capability

use crate::landmarks::FaceMesh;
use crate::FeatureError;
use video_frame::VideoFrame;

/// Locates facial landmarks in a frame.
///
/// `Ok(None)` means no face is in view. `Err` or a mesh missing eye/iris
/// landmarks means a partial detection.
pub trait FaceMeshDetector: Send + Sync {
    fn detect(&self, frame: &VideoFrame) -> Result<Option<FaceMesh>, FeatureError>;
}

impl<D: FaceMeshDetector + ?Sized> FaceMeshDetector for Box<D> {
    fn detect(&self, frame: &VideoFrame) -> Result<Option<FaceMesh>, FeatureError> {
        (**self).detect(frame)
    }
}

impl<D: FaceMeshDetector + ?Sized> FaceMeshDetector for std::sync::Arc<D> {
    fn detect(&self, frame: &VideoFrame) -> Result<Option<FaceMesh>, FeatureError> {
        (**self).detect(frame)
    }
}

/// Detector that never finds a face
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetector;

impl FaceMeshDetector for NoFaceDetector {
    fn detect(&self, _frame: &VideoFrame) -> Result<Option<FaceMesh>, FeatureError> {
        Ok(None)
    }
}

/// Detector that reports the same mesh for every frame
#[derive(Debug, Clone)]
pub struct FixedFaceMesh {
    mesh: FaceMesh,
}

impl FixedFaceMesh {
    pub fn new(mesh: FaceMesh) -> Self {
        Self { mesh }
    }
}

impl FaceMeshDetector for FixedFaceMesh {
    fn detect(&self, _frame: &VideoFrame) -> Result<Option<FaceMesh>, FeatureError> {
        Ok(Some(self.mesh.clone()))
    }
}
