//! Adaptive duplicate-frame detection.
//!
//! A fixed "no visible change" threshold does not survive contact with real
//! recordings: the difference between two visually identical frames depends
//! on capture noise, bitrate, and scene brightness. [`AdaptiveDuplicateDetector`]
//! instead tracks the recording's own noise floor as an exponential moving
//! average (EMA) of the difference signal and derives the threshold from it.
//!
//! The threshold used to classify frame *i* is always the one computed from
//! frames *0..i*; frame *i*'s own score is folded in only afterwards.
//!
//! # Example
//!
//! ```
//! use judder::{AdaptiveDuplicateDetector, DuplicateDetectionOptions};
//!
//! let mut detector = AdaptiveDuplicateDetector::new(&DuplicateDetectionOptions::default());
//! assert!(detector.observe(0.0).is_duplicate);
//! assert!(!detector.observe(12.0).is_duplicate);
//! ```

use crate::configuration::DuplicateDetectionOptions;

/// The running EMA noise floor and the threshold derived from it.
///
/// The noise floor never goes negative and never jumps straight to the
/// latest score; the threshold is additionally capped by the configured
/// ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveThreshold {
    noise_floor: f64,
    initial_noise_floor: f64,
    smoothing_factor: f64,
    sensitivity: f64,
    ceiling: f64,
}

impl AdaptiveThreshold {
    /// Create a threshold in its initial state.
    pub fn new(options: &DuplicateDetectionOptions) -> Self {
        let initial_noise_floor = options.initial_noise_floor.max(0.0);
        Self {
            noise_floor: initial_noise_floor,
            initial_noise_floor,
            smoothing_factor: options.smoothing_factor,
            sensitivity: options.sensitivity,
            ceiling: options.ceiling.max(0.0),
        }
    }

    /// The threshold currently in effect.
    pub fn value(&self) -> f64 {
        (self.sensitivity * self.noise_floor).min(self.ceiling)
    }

    /// The current EMA noise floor.
    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    /// Fold one difference score into the EMA.
    pub fn update(&mut self, score: f64) {
        let alpha = self.smoothing_factor;
        self.noise_floor = (alpha * score.max(0.0) + (1.0 - alpha) * self.noise_floor).max(0.0);
    }

    /// Return to the initial noise floor.
    pub fn reset(&mut self) {
        self.noise_floor = self.initial_noise_floor;
    }
}

/// Outcome of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateDecision {
    /// Whether the frame repeats its predecessor.
    pub is_duplicate: bool,
    /// Threshold the score was compared against.
    pub threshold: f64,
    /// Whether the score was large enough to reset the noise floor.
    pub scene_cut: bool,
}

/// Classifies frames as duplicates of their predecessor.
///
/// Owns its [`AdaptiveThreshold`]; one detector per analysis run.
#[derive(Debug, Clone)]
pub struct AdaptiveDuplicateDetector {
    threshold: AdaptiveThreshold,
    scene_cut_threshold: f64,
}

impl AdaptiveDuplicateDetector {
    /// Create a detector from its settings.
    pub fn new(options: &DuplicateDetectionOptions) -> Self {
        Self {
            threshold: AdaptiveThreshold::new(options),
            scene_cut_threshold: options.scene_cut_threshold,
        }
    }

    /// The adaptive threshold state.
    pub fn threshold(&self) -> &AdaptiveThreshold {
        &self.threshold
    }

    /// Classify a frame from its difference score, then adapt.
    ///
    /// The frame is a duplicate iff `score <= threshold`, with the threshold
    /// taken *before* this score is folded in. Scores above the scene-cut
    /// threshold reset the noise floor rather than dragging it upward.
    pub fn observe(&mut self, score: f64) -> DuplicateDecision {
        let threshold = self.threshold.value();
        let is_duplicate = score <= threshold;

        let scene_cut = score > self.scene_cut_threshold;
        if scene_cut {
            log::debug!(
                "Scene cut (score {score:.2} > {:.2}), resetting noise floor",
                self.scene_cut_threshold
            );
            self.threshold.reset();
        } else {
            self.threshold.update(score);
        }

        DuplicateDecision {
            is_duplicate,
            threshold,
            scene_cut,
        }
    }
}
