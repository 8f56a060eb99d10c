//! Video frame buffer and pixel conversions

use crate::FrameError;
use image::{imageops, GrayImage};

/// Channel order of a packed 8-bit frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Blue, green, red (typical webcam capture order)
    #[default]
    Bgr24,
    Rgb24,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn channels(&self) -> usize {
        3
    }
}

/// Packed 8-bit video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Channel order of `data`
    pub format: PixelFormat,
    /// Monotonic capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a frame, checking that the buffer matches the dimensions
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        timestamp_ns: u64,
        sequence: u32,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            format,
            timestamp_ns,
            sequence,
        })
    }

    /// Solid-color frame, mostly useful for wiring and tests
    pub fn filled(width: u32, height: u32, format: PixelFormat, value: u8, timestamp_ns: u64) -> Self {
        Self {
            data: vec![value; width as usize * height as usize * format.channels()],
            width,
            height,
            format,
            timestamp_ns,
            sequence: 0,
        }
    }

    /// Get pixel at (x, y) as RGB regardless of the stored channel order
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.data.get(idx..idx + 3)?;
        Some(match self.format {
            PixelFormat::Rgb24 => [px[0], px[1], px[2]],
            PixelFormat::Bgr24 => [px[2], px[1], px[0]],
        })
    }

    /// Convert to grayscale
    pub fn to_grayscale(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.get_pixel(x, y).unwrap_or([0, 0, 0]);
            // Luminance: 0.299*R + 0.587*G + 0.114*B
            let luma = r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114;
            image::Luma([luma.round().min(255.0) as u8])
        })
    }

    /// Grayscale copy resized to `size`x`size`
    pub fn to_grayscale_square(&self, size: u32) -> GrayImage {
        imageops::resize(&self.to_grayscale(), size, size, imageops::FilterType::Triangle)
    }

    /// Crop a region of the frame
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Result<VideoFrame, FrameError> {
        let out_of_bounds = w == 0
            || h == 0
            || x.checked_add(w).map_or(true, |r| r > self.width)
            || y.checked_add(h).map_or(true, |b| b > self.height);
        if out_of_bounds {
            return Err(FrameError::CropOutOfBounds { x, y, w, h });
        }

        let mut cropped = Vec::with_capacity(w as usize * h as usize * 3);
        for row in y..(y + h) {
            let start = (row as usize * self.width as usize + x as usize) * 3;
            let end = start + w as usize * 3;
            let pixels = self.data.get(start..end).ok_or(FrameError::BufferSize {
                expected: self.width as usize * self.height as usize * 3,
                actual: self.data.len(),
            })?;
            cropped.extend_from_slice(pixels);
        }

        Ok(VideoFrame {
            data: cropped,
            width: w,
            height: h,
            format: self.format,
            timestamp_ns: self.timestamp_ns,
            sequence: self.sequence,
        })
    }
}
