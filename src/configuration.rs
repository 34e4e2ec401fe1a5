//! Analysis configuration.
//!
//! [`AnalysisOptions`] is a builder that threads the detector tunables,
//! progress callbacks, and cancellation tokens through an analysis run
//! without polluting every function signature. The per-stage settings live
//! in [`DuplicateDetectionOptions`], [`MotionOptions`], and
//! [`ScoringOptions`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use judder::{AnalysisOptions, CancellationToken, DuplicateDetectionOptions, MotionOptions};
//!
//! let token = CancellationToken::new();
//! let options = AnalysisOptions::new()
//!     .with_duplicate_detection(DuplicateDetectionOptions::new().smoothing_factor(0.05))
//!     .with_motion(MotionOptions::new().window(8))
//!     .with_gap_threshold(Duration::from_millis(250))
//!     .with_cancellation(token.clone());
//!
//! assert!(options.validate().is_ok());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::error::JudderError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default width of the luma plane frames are reduced to before differencing.
pub const DEFAULT_ANALYSIS_WIDTH: u32 = 320;
/// Default height of the luma plane frames are reduced to before differencing.
pub const DEFAULT_ANALYSIS_HEIGHT: u32 = 180;

/// Settings for the adaptive duplicate-frame detector.
///
/// The detector keeps an exponential moving average (EMA) of recent
/// difference scores as the noise floor of the recording. The threshold in
/// effect for a frame is `min(sensitivity × noise_floor, ceiling)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateDetectionOptions {
    /// EMA smoothing factor α in `(0, 1)`. Default: 0.1.
    ///
    /// Small values adapt slowly and resist noise; large values adapt
    /// quickly but start treating sustained motion as the new normal.
    pub smoothing_factor: f64,
    /// Multiplier applied to the noise floor to obtain the threshold.
    /// Default: 1.5.
    pub sensitivity: f64,
    /// Upper bound on the threshold, in mean-absolute-difference units
    /// (0–255). Default: 3.0.
    ///
    /// Sensor noise and compression shimmer on a still picture sit below
    /// this, so exact repeats in noisy footage are still caught.
    pub ceiling: f64,
    /// Difference scores above this value are treated as scene cuts and
    /// reset the noise floor instead of being averaged in. Default: 40.0.
    pub scene_cut_threshold: f64,
    /// Noise floor used before any frame has been seen and after a scene
    /// cut. Default: 0.5.
    pub initial_noise_floor: f64,
}

impl Default for DuplicateDetectionOptions {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.1,
            sensitivity: 1.5,
            ceiling: 3.0,
            scene_cut_threshold: 40.0,
            initial_noise_floor: 0.5,
        }
    }
}

impl DuplicateDetectionOptions {
    /// Create duplicate detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the EMA smoothing factor α.
    #[must_use]
    pub fn smoothing_factor(mut self, alpha: f64) -> Self {
        self.smoothing_factor = alpha;
        self
    }

    /// Set the noise-floor multiplier.
    #[must_use]
    pub fn sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Set the threshold ceiling.
    #[must_use]
    pub fn ceiling(mut self, ceiling: f64) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Set the scene-cut reset threshold.
    #[must_use]
    pub fn scene_cut_threshold(mut self, threshold: f64) -> Self {
        self.scene_cut_threshold = threshold;
        self
    }

    /// Set the initial (and post-cut) noise floor.
    #[must_use]
    pub fn initial_noise_floor(mut self, noise_floor: f64) -> Self {
        self.initial_noise_floor = noise_floor;
        self
    }

    fn validate(&self) -> Result<(), JudderError> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor < 1.0) {
            return Err(JudderError::invalid_option(
                "smoothing_factor",
                format!("must be in (0, 1), got {}", self.smoothing_factor),
            ));
        }
        if !(self.sensitivity.is_finite() && self.sensitivity > 0.0) {
            return Err(JudderError::invalid_option(
                "sensitivity",
                format!("must be positive, got {}", self.sensitivity),
            ));
        }
        if !(self.ceiling.is_finite() && self.ceiling >= 0.0) {
            return Err(JudderError::invalid_option(
                "ceiling",
                format!("must be non-negative, got {}", self.ceiling),
            ));
        }
        if !(self.initial_noise_floor.is_finite() && self.initial_noise_floor >= 0.0) {
            return Err(JudderError::invalid_option(
                "initial_noise_floor",
                format!("must be non-negative, got {}", self.initial_noise_floor),
            ));
        }
        if !(self.scene_cut_threshold > self.ceiling) {
            return Err(JudderError::invalid_option(
                "scene_cut_threshold",
                format!(
                    "must exceed the ceiling ({}), got {}",
                    self.ceiling, self.scene_cut_threshold
                ),
            ));
        }
        Ok(())
    }
}

/// Settings for the motion classifier.
///
/// Motion is judged from the median difference score of the last `window`
/// frames that actually changed. A frame counts as moving when that median
/// reaches both `activity_floor` and `noise_margin` times the current
/// duplicate threshold, and the current freeze is no longer than
/// `max_hold_frames`.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionOptions {
    /// Minimum median difference score for content to count as animating.
    /// Default: 2.0.
    pub activity_floor: f64,
    /// Activity must also reach this multiple of the duplicate threshold,
    /// so frame-to-frame noise on a still picture is not taken for motion.
    /// Default: 2.0.
    pub noise_margin: f64,
    /// Number of content-change samples in the window. Default: 5.
    pub window: usize,
    /// Longest run of consecutive duplicates still attributed to a stall
    /// during motion. Longer freezes are treated as static scenes.
    /// Default: 30.
    pub max_hold_frames: u64,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            activity_floor: 2.0,
            noise_margin: 2.0,
            window: 5,
            max_hold_frames: 30,
        }
    }
}

impl MotionOptions {
    /// Create motion settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the activity floor.
    #[must_use]
    pub fn activity_floor(mut self, floor: f64) -> Self {
        self.activity_floor = floor;
        self
    }

    /// Set the multiple of the duplicate threshold activity must reach.
    #[must_use]
    pub fn noise_margin(mut self, margin: f64) -> Self {
        self.noise_margin = margin;
        self
    }

    /// Set the window size (number of content-change samples).
    #[must_use]
    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the longest freeze still considered a stall during motion.
    #[must_use]
    pub fn max_hold_frames(mut self, frames: u64) -> Self {
        self.max_hold_frames = frames;
        self
    }

    fn validate(&self) -> Result<(), JudderError> {
        if self.window == 0 {
            return Err(JudderError::invalid_option(
                "motion window",
                "must hold at least one sample",
            ));
        }
        if !(self.activity_floor.is_finite() && self.activity_floor >= 0.0) {
            return Err(JudderError::invalid_option(
                "activity_floor",
                format!("must be non-negative, got {}", self.activity_floor),
            ));
        }
        if !(self.noise_margin.is_finite() && self.noise_margin >= 0.0) {
            return Err(JudderError::invalid_option(
                "noise_margin",
                format!("must be non-negative, got {}", self.noise_margin),
            ));
        }
        Ok(())
    }
}

/// Weights used by the [`SmoothnessScorer`](crate::SmoothnessScorer).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOptions {
    /// Points deducted per unit of stutter share (stutter frames / moving
    /// frames). The deduction is capped at 100, so half the motion lost to
    /// stutter scores zero. Default: 200.
    pub stutter_weight: f64,
    /// Maximum points deducted for each of average fps and 1%-low fps
    /// falling short of `target_fps`. Default: 25.
    pub pacing_weight: f64,
    /// Frame rate at or above which pacing is not penalized. Default: 30.
    pub target_fps: f64,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            stutter_weight: 200.0,
            pacing_weight: 25.0,
            target_fps: 30.0,
        }
    }
}

impl ScoringOptions {
    /// Create scoring settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stutter weight.
    #[must_use]
    pub fn stutter_weight(mut self, weight: f64) -> Self {
        self.stutter_weight = weight;
        self
    }

    /// Set the pacing weight.
    #[must_use]
    pub fn pacing_weight(mut self, weight: f64) -> Self {
        self.pacing_weight = weight;
        self
    }

    /// Set the target frame rate.
    #[must_use]
    pub fn target_fps(mut self, fps: f64) -> Self {
        self.target_fps = fps;
        self
    }

    fn validate(&self) -> Result<(), JudderError> {
        if !(self.stutter_weight.is_finite() && self.stutter_weight >= 0.0) {
            return Err(JudderError::invalid_option(
                "stutter_weight",
                format!("must be non-negative, got {}", self.stutter_weight),
            ));
        }
        if !(self.pacing_weight.is_finite() && self.pacing_weight >= 0.0) {
            return Err(JudderError::invalid_option(
                "pacing_weight",
                format!("must be non-negative, got {}", self.pacing_weight),
            ));
        }
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(JudderError::invalid_option(
                "target_fps",
                format!("must be positive, got {}", self.target_fps),
            ));
        }
        Ok(())
    }
}

/// Configuration for an analysis run.
///
/// All fields have defaults tuned for 30–144 fps gameplay captures. Pass a
/// reference to this struct to [`StutterAnalyzer::new`](crate::StutterAnalyzer::new)
/// or [`analyze_with_options`](crate::analyze_with_options).
#[derive(Clone)]
pub struct AnalysisOptions {
    pub(crate) duplicate: DuplicateDetectionOptions,
    pub(crate) motion: MotionOptions,
    pub(crate) scoring: ScoringOptions,
    /// Frame-time intervals longer than this are capture discontinuities.
    pub(crate) gap_threshold: Duration,
    /// Per-pixel luma deltas at or below this value count as no change.
    pub(crate) pixel_tolerance: u8,
    /// Size of the luma plane frame sources reduce frames to.
    pub(crate) analysis_resolution: (u32, u32),
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
    /// Expected frame count, used for progress percentages only.
    pub(crate) expected_frames: Option<u64>,
}

impl Debug for AnalysisOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnalysisOptions")
            .field("duplicate", &self.duplicate)
            .field("motion", &self.motion)
            .field("scoring", &self.scoring)
            .field("gap_threshold", &self.gap_threshold)
            .field("pixel_tolerance", &self.pixel_tolerance)
            .field("analysis_resolution", &self.analysis_resolution)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    /// Create a new configuration with default settings.
    ///
    /// Defaults: α = 0.1, motion window 5, gap threshold 500 ms, 320×180
    /// analysis resolution, no progress callback, no cancellation.
    pub fn new() -> Self {
        Self {
            duplicate: DuplicateDetectionOptions::default(),
            motion: MotionOptions::default(),
            scoring: ScoringOptions::default(),
            gap_threshold: Duration::from_millis(500),
            pixel_tolerance: 0,
            analysis_resolution: (DEFAULT_ANALYSIS_WIDTH, DEFAULT_ANALYSIS_HEIGHT),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
            expected_frames: None,
        }
    }

    /// Replace the duplicate detection settings.
    #[must_use]
    pub fn with_duplicate_detection(mut self, options: DuplicateDetectionOptions) -> Self {
        self.duplicate = options;
        self
    }

    /// Replace the motion classifier settings.
    #[must_use]
    pub fn with_motion(mut self, options: MotionOptions) -> Self {
        self.motion = options;
        self
    }

    /// Replace the scoring weights.
    #[must_use]
    pub fn with_scoring(mut self, options: ScoringOptions) -> Self {
        self.scoring = options;
        self
    }

    /// Set the frame-time gap above which an interval is treated as a
    /// capture discontinuity and excluded from frame-rate statistics.
    #[must_use]
    pub fn with_gap_threshold(mut self, threshold: Duration) -> Self {
        self.gap_threshold = threshold;
        self
    }

    /// Ignore per-pixel luma deltas at or below `tolerance`.
    ///
    /// Useful for heavily compressed footage where visually identical
    /// frames are re-encoded with slightly different pixels.
    #[must_use]
    pub fn with_pixel_tolerance(mut self, tolerance: u8) -> Self {
        self.pixel_tolerance = tolerance;
        self
    }

    /// Set the resolution frame sources reduce frames to before analysis.
    #[must_use]
    pub fn with_analysis_resolution(mut self, width: u32, height: u32) -> Self {
        self.analysis_resolution = (width, height);
        self
    }

    /// Attach a progress callback.
    ///
    /// The callback is invoked every [`batch_size`](AnalysisOptions::with_batch_size)
    /// frames.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the run stops at the next frame boundary
    /// and returns a report covering the frames analyzed so far.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Provide the expected number of frames so progress reports can carry
    /// a percentage and an ETA.
    #[must_use]
    pub fn with_expected_frames(mut self, frames: u64) -> Self {
        self.expected_frames = Some(frames);
        self
    }

    /// Duplicate detection settings.
    pub fn duplicate_detection(&self) -> &DuplicateDetectionOptions {
        &self.duplicate
    }

    /// Motion classifier settings.
    pub fn motion(&self) -> &MotionOptions {
        &self.motion
    }

    /// Scoring weights.
    pub fn scoring(&self) -> &ScoringOptions {
        &self.scoring
    }

    /// Discontinuity threshold.
    pub fn gap_threshold(&self) -> Duration {
        self.gap_threshold
    }

    /// Analysis resolution as `(width, height)`.
    pub fn analysis_resolution(&self) -> (u32, u32) {
        self.analysis_resolution
    }

    /// Check every setting against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::InvalidConfiguration`] naming the first
    /// offending option.
    pub fn validate(&self) -> Result<(), JudderError> {
        self.duplicate.validate()?;
        self.motion.validate()?;
        self.scoring.validate()?;
        if self.gap_threshold.is_zero() {
            return Err(JudderError::invalid_option(
                "gap_threshold",
                "must be greater than zero",
            ));
        }
        let (width, height) = self.analysis_resolution;
        if width == 0 || height == 0 {
            return Err(JudderError::invalid_option(
                "analysis_resolution",
                format!("must be non-zero, got {width}x{height}"),
            ));
        }
        Ok(())
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
