//! Frame-time statistics and variable frame rate (VFR) detection.
//!
//! [`FrameTimingAnalysis`] summarizes the distribution of capture intervals
//! of a recording: whether it is constant or variable frame rate, and its
//! instantaneous fps range. The percentile helper used for the 1%-low and
//! 0.1%-low metrics lives here as well.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use judder::FrameTimingAnalysis;
//!
//! let intervals = vec![Duration::from_micros(16_667); 120];
//! let timing = FrameTimingAnalysis::from_frame_times(&intervals);
//! assert!(!timing.is_vfr);
//! assert!((timing.mean_fps - 60.0).abs() < 0.1);
//! ```

use std::time::Duration;

/// Results of timing analysis over a recording's frame intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTimingAnalysis {
    /// Whether the recording appears to be variable frame rate.
    ///
    /// This is `true` when the standard deviation of frame durations exceeds
    /// 10% of the mean frame duration.
    pub is_vfr: bool,
    /// Mean frame duration in seconds.
    pub mean_frame_duration: f64,
    /// Standard deviation of frame durations in seconds.
    pub frame_duration_stddev: f64,
    /// Minimum instantaneous FPS observed.
    pub min_fps: f64,
    /// Maximum instantaneous FPS observed.
    pub max_fps: f64,
    /// Mean FPS (1 / mean_frame_duration).
    pub mean_fps: f64,
    /// Number of intervals analyzed.
    pub intervals_analyzed: u64,
}

impl FrameTimingAnalysis {
    /// Analyze a list of frame intervals.
    ///
    /// Zero-length intervals are ignored. With no usable intervals every
    /// statistic is zero and `is_vfr` is `false`.
    pub fn from_frame_times(frame_times: &[Duration]) -> Self {
        let durations: Vec<f64> = frame_times
            .iter()
            .map(Duration::as_secs_f64)
            .filter(|&d| d > 0.0)
            .collect();

        if durations.is_empty() {
            return Self {
                is_vfr: false,
                mean_frame_duration: 0.0,
                frame_duration_stddev: 0.0,
                min_fps: 0.0,
                max_fps: 0.0,
                mean_fps: 0.0,
                intervals_analyzed: 0,
            };
        }

        let mean = durations.iter().sum::<f64>() / durations.len() as f64;
        let variance =
            durations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / durations.len() as f64;
        let stddev = variance.sqrt();

        let min_duration = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max_duration = durations.iter().copied().fold(0.0_f64, f64::max);

        let max_fps = if min_duration > 0.0 { 1.0 / min_duration } else { 0.0 };
        let min_fps = if max_duration > 0.0 { 1.0 / max_duration } else { 0.0 };
        let mean_fps = if mean > 0.0 { 1.0 / mean } else { 0.0 };

        // 1/mean can land a hair outside [min_fps, max_fps] through rounding.
        let mean_fps = mean_fps.clamp(min_fps, max_fps);

        let is_vfr = mean > 0.0 && (stddev / mean) > 0.10;

        Self {
            is_vfr,
            mean_frame_duration: mean,
            frame_duration_stddev: stddev,
            min_fps,
            max_fps,
            mean_fps,
            intervals_analyzed: durations.len() as u64,
        }
    }
}

/// Value at the `fraction` percentile of an ascending-sorted slice.
///
/// Uses the nearest-rank-below convention, `sorted[min(⌊n·fraction⌋, n−1)]`,
/// so the 99th percentile of 100 samples is the largest one. Returns `None`
/// for an empty slice.
pub(crate) fn percentile(sorted: &[Duration], fraction: f64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let index = ((sorted.len() as f64 * fraction) as usize).min(sorted.len() - 1);
    Some(sorted[index])
}

/// Arithmetic mean of a list of durations.
pub(crate) fn mean_duration(durations: &[Duration]) -> Option<Duration> {
    if durations.is_empty() {
        return None;
    }
    let total: f64 = durations.iter().map(Duration::as_secs_f64).sum();
    Some(Duration::from_secs_f64(total / durations.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_picks_worst_percent() {
        let mut times: Vec<Duration> = (1..=100).map(Duration::from_millis).collect();
        times.sort();
        assert_eq!(percentile(&times, 0.99), Some(Duration::from_millis(100)));
        assert_eq!(percentile(&times, 0.5), Some(Duration::from_millis(51)));
    }

    #[test]
    fn percentile_of_empty_is_none() {
        assert_eq!(percentile(&[], 0.99), None);
    }

    #[test]
    fn mean_of_durations() {
        let times = [Duration::from_millis(10), Duration::from_millis(30)];
        let mean = mean_duration(&times).unwrap();
        assert!(mean.abs_diff(Duration::from_millis(20)) < Duration::from_micros(1));
    }
}
