//! Motion classification.
//!
//! A duplicate frame while the picture is animating means the game or the
//! capture pipeline stalled; a duplicate frame while nothing is moving is
//! simply a still picture. [`MotionClassifier`] decides which of the two
//! applies to each frame.
//!
//! The activity signal is the median difference score over the last
//! `window` frames that actually changed. Duplicates do not enter the
//! window, so a freeze does not erase the evidence of the motion it
//! interrupted; instead, a freeze longer than `max_hold_frames` is taken as
//! a static scene (pause menu, loading screen). The median keeps a single
//! flicker from looking like sustained motion, and a single quiet frame from
//! hiding it.
//!
//! Activity is measured against the duplicate detector's current threshold
//! as well as a fixed floor: on a noisy still picture every frame differs a
//! little, and that noise must clear `noise_margin` times the threshold
//! before it counts as motion.

use std::collections::VecDeque;

use crate::configuration::MotionOptions;

/// Outcome of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDecision {
    /// Whether the content is considered to be animating at this frame.
    pub is_moving: bool,
    /// Median of the window, once the window is full.
    pub activity: Option<f64>,
}

/// Tracks recent content changes and classifies frames as moving or static.
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    samples: VecDeque<f64>,
    window: usize,
    activity_floor: f64,
    noise_margin: f64,
    max_hold_frames: u64,
    duplicate_run: u64,
}

impl MotionClassifier {
    /// Create a classifier from its settings.
    pub fn new(options: &MotionOptions) -> Self {
        let window = options.window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
            activity_floor: options.activity_floor,
            noise_margin: options.noise_margin,
            max_hold_frames: options.max_hold_frames,
            duplicate_run: 0,
        }
    }

    /// Classify the current frame.
    ///
    /// `score` is the frame's difference score, `is_duplicate` the duplicate
    /// detector's verdict for the same frame, and `noise_threshold` the
    /// detector's threshold after taking the frame into account.
    pub fn observe(
        &mut self,
        score: f64,
        is_duplicate: bool,
        noise_threshold: f64,
    ) -> MotionDecision {
        if is_duplicate {
            self.duplicate_run += 1;
        } else {
            self.duplicate_run = 0;
            if self.samples.len() == self.window {
                self.samples.pop_front();
            }
            self.samples.push_back(score);
        }

        let activity = self.activity();
        let floor = self.activity_floor.max(self.noise_margin * noise_threshold);
        let is_moving = activity.is_some_and(|median| median >= floor)
            && self.duplicate_run <= self.max_hold_frames;

        MotionDecision {
            is_moving,
            activity,
        }
    }

    /// Median of the window, or `None` while there is not enough history.
    pub fn activity(&self) -> Option<f64> {
        if self.samples.len() < self.window {
            return None;
        }

        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let middle = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[middle - 1] + sorted[middle]) / 2.0)
        } else {
            Some(sorted[middle])
        }
    }

    /// Mean of the samples currently in the window (zero when empty).
    pub fn mean_activity(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 0.75;

    fn classifier() -> MotionClassifier {
        MotionClassifier::new(&MotionOptions::default())
    }

    #[test]
    fn not_moving_without_history() {
        let mut classifier = classifier();
        for _ in 0..4 {
            assert!(!classifier.observe(20.0, false, THRESHOLD).is_moving);
        }
        assert!(classifier.observe(20.0, false, THRESHOLD).is_moving);
    }

    #[test]
    fn single_flicker_is_not_motion() {
        let mut classifier = classifier();
        for _ in 0..5 {
            classifier.observe(0.5, false, THRESHOLD);
        }
        assert!(!classifier.observe(90.0, false, THRESHOLD).is_moving);
    }

    #[test]
    fn short_freeze_keeps_motion() {
        let mut classifier = classifier();
        for _ in 0..5 {
            classifier.observe(10.0, false, THRESHOLD);
        }
        for _ in 0..10 {
            assert!(classifier.observe(0.0, true, THRESHOLD).is_moving);
        }
    }

    #[test]
    fn long_freeze_becomes_static() {
        let mut classifier = classifier();
        for _ in 0..5 {
            classifier.observe(10.0, false, THRESHOLD);
        }
        let moving = (0..40)
            .filter(|_| classifier.observe(0.0, true, THRESHOLD).is_moving)
            .count();
        assert_eq!(moving, 30);
    }

    #[test]
    fn noise_near_the_threshold_is_not_motion() {
        let mut classifier = classifier();
        // Above the fixed floor, but under twice the threshold.
        for _ in 0..5 {
            classifier.observe(3.2, false, 2.5);
        }
        let decision = classifier.observe(3.2, false, 2.5);
        assert_eq!(decision.activity, Some(3.2));
        assert!(!decision.is_moving);

        assert!(classifier.observe(3.2, false, 1.6).is_moving);
    }

    #[test]
    fn median_of_even_window() {
        let mut classifier = MotionClassifier::new(&MotionOptions::new().window(4));
        for score in [1.0, 2.0, 3.0, 10.0] {
            classifier.observe(score, false, THRESHOLD);
        }
        assert_eq!(classifier.activity(), Some(2.5));
        assert!((classifier.mean_activity() - 4.0).abs() < 1e-12);
    }
}
