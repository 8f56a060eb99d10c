//! Video Frame Types
//!
//! The analysis entry point consumes one raw, fixed-channel-order pixel buffer
//! per call. Frame acquisition happens elsewhere; this crate only describes
//! and validates the buffer and offers the conversions classifiers need.

mod frame;

pub use frame::{PixelFormat, VideoFrame};

use thiserror::Error;

/// Frame error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Crop region {x},{y} {w}x{h} exceeds frame bounds")]
    CropOutOfBounds { x: u32, y: u32, w: u32, h: u32 },
}
