//! Frames as seen by the analyzer.
//!
//! A [`Frame`] is a single 8-bit luma plane plus the capture timestamp of
//! the image it was derived from. Frame sources (the FFmpeg decoder, the
//! image-sequence loader, or caller code) reduce every decoded image to a
//! common, small analysis resolution so that differencing is cheap and
//! compression noise averages out.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use image::{DynamicImage, RgbImage};
//! use judder::Frame;
//!
//! let image = DynamicImage::ImageRgb8(RgbImage::new(1920, 1080));
//! let frame = Frame::from_image(&image, Duration::from_millis(16), (320, 180));
//! assert_eq!((frame.width(), frame.height()), (320, 180));
//! ```

use std::time::Duration;

use image::{DynamicImage, GrayImage, imageops::FilterType};

use crate::error::JudderError;

/// A decoded frame reduced to a luma plane, with its capture timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    luma: Vec<u8>,
    timestamp: Duration,
}

impl Frame {
    /// Wrap a tightly-packed luma plane.
    ///
    /// The buffer is not checked here; the analyzer rejects frames whose
    /// buffer length does not match `width × height` with
    /// [`JudderError::DecodeInput`], naming the frame index.
    pub fn from_luma(width: u32, height: u32, luma: Vec<u8>, timestamp: Duration) -> Self {
        Self {
            width,
            height,
            luma,
            timestamp,
        }
    }

    /// Convert a decoded image to luma and resize it to `resolution`.
    ///
    /// Images already at the target size are only converted.
    pub fn from_image(image: &DynamicImage, timestamp: Duration, resolution: (u32, u32)) -> Self {
        let (width, height) = resolution;
        let gray: GrayImage = if image.width() == width && image.height() == height {
            image.to_luma8()
        } else {
            image
                .resize_exact(width, height, FilterType::Triangle)
                .to_luma8()
        };

        Self {
            width,
            height,
            luma: gray.into_raw(),
            timestamp,
        }
    }

    /// Width of the luma plane in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the luma plane in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The luma samples, row-major, one byte per pixel.
    pub fn luma(&self) -> &[u8] {
        &self.luma
    }

    /// Capture timestamp relative to the start of the stream.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Check that the frame is internally consistent.
    pub(crate) fn check(&self, frame_index: u64) -> Result<(), JudderError> {
        if self.width == 0 || self.height == 0 {
            return Err(JudderError::decode_input(
                frame_index,
                format!("zero-sized frame ({}x{})", self.width, self.height),
            ));
        }
        let expected = self.width as usize * self.height as usize;
        if self.luma.len() != expected {
            return Err(JudderError::decode_input(
                frame_index,
                format!(
                    "luma buffer holds {} bytes, expected {expected} for {}x{}",
                    self.luma.len(),
                    self.width,
                    self.height
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_rejects_truncated_buffer() {
        let frame = Frame::from_luma(4, 4, vec![0; 15], Duration::ZERO);
        let error = frame.check(7).unwrap_err();
        assert!(matches!(error, JudderError::DecodeInput { frame_index: 7, .. }));
    }

    #[test]
    fn check_rejects_zero_size() {
        let frame = Frame::from_luma(0, 4, Vec::new(), Duration::ZERO);
        assert!(frame.check(0).is_err());
    }

    #[test]
    fn from_image_converts_to_luma() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            8,
            image::Rgb([255, 255, 255]),
        ));
        let frame = Frame::from_image(&image, Duration::ZERO, (8, 8));
        assert_eq!(frame.luma().len(), 64);
        assert!(frame.luma().iter().all(|&value| value == 255));
    }
}
