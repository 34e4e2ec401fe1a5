//! Smoothness scoring.
//!
//! [`SmoothnessScorer`] reduces [`Metrics`] to a single value in
//! `[0, 100]`:
//!
//! ```text
//! score = 100 − stutter_penalty − pacing_penalty
//! stutter_penalty = min(100, stutter_weight × stutter_frames / moving_frames)
//! pacing_penalty  = pacing_weight × max(0, 1 − average_fps / target_fps)
//!                 + pacing_weight × max(0, 1 − one_percent_low_fps / target_fps)
//! ```
//!
//! The stutter share is measured against the frames that were moving, so a
//! recording that freezes on half of its animated frames loses the full
//! stutter penalty however uniform its capture intervals are. Duplicate
//! frames of still content are not penalized.
//!
//! The score never rises with more stutter (frames or events) and never
//! falls with a higher average or 1%-low frame rate.

use crate::aggregate::Metrics;
use crate::configuration::ScoringOptions;

/// The inputs the score depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    /// Mean frame rate over valid intervals.
    pub average_fps: f64,
    /// 1%-low frame time, in seconds.
    pub one_percent_low_frame_time: f64,
    /// Duplicate frames (accepted for completeness; not penalized).
    pub duplicate_frames: u64,
    /// Coalesced stutter events.
    pub stutter_events: u64,
    /// Frames that were duplicates during motion.
    pub stutter_frames: u64,
    /// Frames classified as moving.
    pub moving_frames: u64,
    /// Frames with a valid capture interval. Stands in for `moving_frames`
    /// when that is zero.
    pub valid_frames: u64,
}

impl ScoreInputs {
    /// Extract score inputs from metrics.
    ///
    /// Returns `None` if the frame-rate metrics are unavailable.
    pub fn from_metrics(metrics: &Metrics) -> Option<Self> {
        let average_fps = metrics.average_fps?;
        let one_percent_low = metrics.one_percent_low_frame_time?;
        if metrics.valid_intervals == 0 {
            return None;
        }
        Some(Self {
            average_fps,
            one_percent_low_frame_time: one_percent_low.as_secs_f64(),
            duplicate_frames: metrics.duplicate_frames,
            stutter_events: metrics.stutter_events,
            stutter_frames: metrics.stutter_frames,
            moving_frames: metrics.moving_frames,
            valid_frames: metrics.valid_intervals,
        })
    }

    /// Share of moving frames that stuttered, in `[0, 1]`.
    ///
    /// Every event spans at least one frame, so the event count is a lower
    /// bound on the stutter frames.
    pub fn stutter_share(&self) -> f64 {
        let stutter = self.stutter_frames.max(self.stutter_events);
        let moving = if self.moving_frames > 0 {
            self.moving_frames
        } else {
            self.valid_frames
        }
        .max(stutter);

        if moving == 0 {
            0.0
        } else {
            stutter as f64 / moving as f64
        }
    }
}

/// Maps score inputs to a 0–100 smoothness score.
#[derive(Debug, Clone, Default)]
pub struct SmoothnessScorer {
    options: ScoringOptions,
}

impl SmoothnessScorer {
    /// Create a scorer with the given weights.
    pub fn new(options: ScoringOptions) -> Self {
        Self { options }
    }

    /// Score a set of metrics, or `None` if they lack frame-rate data.
    pub fn score_metrics(&self, metrics: &Metrics) -> Option<f64> {
        ScoreInputs::from_metrics(metrics).map(|inputs| self.score(&inputs))
    }

    /// Score explicit inputs.
    pub fn score(&self, inputs: &ScoreInputs) -> f64 {
        let options = &self.options;

        let stutter_penalty = (options.stutter_weight * inputs.stutter_share()).min(100.0);

        let one_percent_low_fps = if inputs.one_percent_low_frame_time > 0.0 {
            1.0 / inputs.one_percent_low_frame_time
        } else {
            0.0
        };
        let shortfall = |fps: f64| (1.0 - fps.max(0.0) / options.target_fps).max(0.0);
        let pacing_penalty = options.pacing_weight
            * (shortfall(inputs.average_fps) + shortfall(one_percent_low_fps));

        (100.0 - stutter_penalty - pacing_penalty).clamp(0.0, 100.0)
    }
}
