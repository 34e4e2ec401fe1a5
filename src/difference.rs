//! Frame differencing.
//!
//! [`FrameDifferencer`] scores the visual change between two consecutive
//! frames as the mean absolute luma difference, in the range `0.0..=255.0`.
//! The score is zero exactly when every pixel delta is within the configured
//! tolerance (with the default tolerance of 0: when the planes are
//! identical).

use crate::error::JudderError;
use crate::frame::Frame;

/// Computes the difference score between consecutive frames.
///
/// Stateless; a single instance can score any number of frame pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDifferencer {
    pixel_tolerance: u8,
}

impl FrameDifferencer {
    /// Create a differencer that ignores per-pixel deltas at or below
    /// `pixel_tolerance`.
    pub fn new(pixel_tolerance: u8) -> Self {
        Self { pixel_tolerance }
    }

    /// Score the change from `previous` to `current`.
    ///
    /// `frame_index` is the index of `current` and only used for error
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::DecodeInput`] if the frames do not share the
    /// same dimensions.
    pub fn difference(
        &self,
        previous: &Frame,
        current: &Frame,
        frame_index: u64,
    ) -> Result<f64, JudderError> {
        if previous.width() != current.width() || previous.height() != current.height() {
            return Err(JudderError::decode_input(
                frame_index,
                format!(
                    "resolution changed from {}x{} to {}x{}",
                    previous.width(),
                    previous.height(),
                    current.width(),
                    current.height()
                ),
            ));
        }

        let samples = current.luma().len();
        if samples == 0 {
            return Ok(0.0);
        }

        let tolerance = self.pixel_tolerance;
        let total: u64 = previous
            .luma()
            .iter()
            .zip(current.luma())
            .map(|(&a, &b)| {
                let delta = a.abs_diff(b);
                if delta > tolerance { delta as u64 } else { 0 }
            })
            .sum();

        Ok(total as f64 / samples as f64)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn plane(values: &[u8]) -> Frame {
        Frame::from_luma(values.len() as u32, 1, values.to_vec(), Duration::ZERO)
    }

    #[test]
    fn identical_frames_score_zero() {
        let frame = plane(&[10, 20, 30, 40]);
        let score = FrameDifferencer::default()
            .difference(&frame, &frame, 1)
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn score_is_mean_absolute_difference() {
        let a = plane(&[0, 0, 100, 100]);
        let b = plane(&[10, 0, 90, 140]);
        let score = FrameDifferencer::default().difference(&a, &b, 1).unwrap();
        assert!((score - 15.0).abs() < 1e-9);
    }

    #[test]
    fn tolerance_suppresses_small_deltas() {
        let a = plane(&[100, 100, 100, 100]);
        let b = plane(&[101, 99, 102, 100]);
        let score = FrameDifferencer::new(2).difference(&a, &b, 1).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn resolution_change_is_rejected() {
        let a = plane(&[0, 0]);
        let b = plane(&[0, 0, 0]);
        let error = FrameDifferencer::default()
            .difference(&a, &b, 3)
            .unwrap_err();
        assert!(matches!(error, JudderError::DecodeInput { frame_index: 3, .. }));
    }
}
