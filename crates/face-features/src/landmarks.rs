//! Landmark points and the face-mesh index convention

use crate::FeatureError;
use serde::{Deserialize, Serialize};

/// Left eye contour indices. Pair (0, 3) spans the eye horizontally and
/// pair (1, 5) vertically.
pub const LEFT_EYE: [usize; 6] = [33, 133, 159, 145, 153, 154];
/// Right eye contour indices, same ordering as [`LEFT_EYE`]
pub const RIGHT_EYE: [usize; 6] = [362, 263, 386, 374, 380, 385];
/// Left iris indices (refined mesh)
pub const LEFT_IRIS: [usize; 4] = [468, 469, 470, 471];
/// Right iris indices (refined mesh)
pub const RIGHT_IRIS: [usize; 4] = [473, 474, 475, 476];

/// Smallest mesh that carries every eye and iris landmark
pub const MIN_MESH_POINTS: usize = 477;

/// 2D point in image (pixel) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Arithmetic mean of a set of points
    pub fn centroid(points: &[Point2]) -> Point2 {
        if points.is_empty() {
            return Point2::default();
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2::new(sx / n, sy / n)
    }
}

/// Six eye-contour points in [`LEFT_EYE`] order
pub type EyeLandmarks = [Point2; 6];
/// Four iris points
pub type IrisLandmarks = [Point2; 4];

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Ordered landmark set for one detected face
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceMesh {
    pub points: Vec<Point2>,
}

impl FaceMesh {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Build from normalized `[0, 1]` coordinates, truncating to whole pixels
    pub fn from_normalized(normalized: &[(f32, f32)], width: u32, height: u32) -> Self {
        let points = normalized
            .iter()
            .map(|&(x, y)| {
                Point2::new(
                    (x as f64 * width as f64).trunc(),
                    (y as f64 * height as f64).trunc(),
                )
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether every eye and iris landmark is present
    pub fn is_complete(&self) -> bool {
        self.points.len() >= MIN_MESH_POINTS
    }

    pub fn point(&self, index: usize) -> Result<Point2, FeatureError> {
        self.points
            .get(index)
            .copied()
            .ok_or(FeatureError::MissingLandmark {
                index,
                available: self.points.len(),
            })
    }

    /// Bounding box of the mesh grown by `margin` (a fraction of the box size
    /// on every side) and clipped to a `width`x`height` frame.
    ///
    /// `None` when the mesh has no finite points or the box falls outside the frame.
    pub fn bounding_box(&self, margin: f64, width: u32, height: u32) -> Option<FaceRegion> {
        let (min_x, min_y, max_x, max_y) = self
            .points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .fold(
                (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
            );
        if min_x > max_x {
            return None;
        }

        let pad_x = (max_x - min_x) * margin;
        let pad_y = (max_y - min_y) * margin;
        let left = (min_x - pad_x).floor().clamp(0.0, width as f64);
        let top = (min_y - pad_y).floor().clamp(0.0, height as f64);
        let right = (max_x + pad_x).ceil().clamp(0.0, width as f64);
        let bottom = (max_y + pad_y).ceil().clamp(0.0, height as f64);
        if right <= left || bottom <= top {
            return None;
        }

        Some(FaceRegion {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// Gather the points at `indices`
    pub fn select<const N: usize>(&self, indices: &[usize; N]) -> Result<[Point2; N], FeatureError> {
        let mut out = [Point2::default(); N];
        for (slot, &index) in out.iter_mut().zip(indices) {
            *slot = self.point(index)?;
        }
        Ok(out)
    }
}
