//! The per-frame analysis pipeline.
//!
//! [`StutterAnalyzer`] wires the stages together for one recording:
//!
//! ```text
//! frame ─► FrameDifferencer ─► AdaptiveDuplicateDetector ─┐
//!                          └─► MotionClassifier ◄─────────┤
//!                                                         ▼
//!                              StutterEventAggregator ─► SmoothnessScorer
//! ```
//!
//! Frames must arrive in timestamp order and are consumed exactly once.
//! All state (threshold, motion window, aggregates) belongs to the analyzer
//! instance, so separate recordings can be analyzed concurrently with
//! separate analyzers.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use judder::{Frame, JudderError};
//!
//! let frames = (0..10u64).map(|index| {
//!     let timestamp = Duration::from_micros(index * 16_667);
//!     Ok::<_, JudderError>(Frame::from_luma(4, 4, vec![(index * 20) as u8; 16], timestamp))
//! });
//!
//! let report = judder::analyze(frames)?;
//! assert_eq!(report.total_frames, 10);
//! assert!(report.smoothness_score.is_some());
//! # Ok::<(), JudderError>(())
//! ```

use std::time::Duration;

use crate::aggregate::{Metrics, StutterEvent, StutterEventAggregator};
use crate::configuration::AnalysisOptions;
use crate::difference::FrameDifferencer;
use crate::duplicate::AdaptiveDuplicateDetector;
use crate::error::JudderError;
use crate::frame::Frame;
use crate::motion::MotionClassifier;
use crate::progress::{Checkpoint, OperationType, ProgressTracker};
use crate::score::SmoothnessScorer;
use crate::timing::FrameTimingAnalysis;

/// How one frame was classified.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClassification {
    /// Position of the frame in the input sequence.
    pub index: u64,
    /// Capture timestamp.
    pub timestamp: Duration,
    /// Interval since the previous frame (`None` for the first frame).
    pub frame_time: Option<Duration>,
    /// Difference score against the previous frame (`None` for the first
    /// frame).
    pub diff_score: Option<f64>,
    /// Duplicate threshold the score was compared against.
    pub threshold: Option<f64>,
    /// Motion activity (window median) at this frame, once known.
    pub activity: Option<f64>,
    /// The frame repeats its predecessor.
    pub is_duplicate: bool,
    /// The content is animating at this frame.
    pub is_moving: bool,
    /// The frame is a duplicate during motion.
    pub is_stutter: bool,
    /// The interval before this frame was excluded from frame-rate
    /// statistics.
    pub is_discontinuity: bool,
}

/// Everything an analysis run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Frames analyzed.
    pub total_frames: u64,
    /// Per-frame classifications, in input order.
    pub classifications: Vec<FrameClassification>,
    /// Stutter events, in input order.
    pub stutter_events: Vec<StutterEvent>,
    /// Aggregated metrics; `None` with fewer than two frames.
    pub metrics: Option<Metrics>,
    /// Smoothness score; `None` when frame-rate metrics are unavailable.
    pub smoothness_score: Option<f64>,
    /// Capture interval statistics over valid intervals.
    pub timing: FrameTimingAnalysis,
    /// The run was stopped early through a cancellation token; everything
    /// above covers the frames analyzed before that.
    pub cancelled: bool,
}

impl AnalysisReport {
    /// The metrics, or [`JudderError::InsufficientData`] with fewer than two
    /// frames.
    pub fn require_metrics(&self) -> Result<&Metrics, JudderError> {
        self.metrics.as_ref().ok_or(JudderError::InsufficientData {
            frames: self.total_frames,
        })
    }

    /// The score, or [`JudderError::InsufficientData`] when it could not be
    /// computed.
    pub fn require_score(&self) -> Result<f64, JudderError> {
        self.smoothness_score.ok_or(JudderError::InsufficientData {
            frames: self.total_frames,
        })
    }
}

/// Streaming analyzer for a single recording.
///
/// Feed frames with [`push`](StutterAnalyzer::push) and collect the result
/// with [`finish`](StutterAnalyzer::finish), or take an intermediate
/// [`report`](StutterAnalyzer::report) at any point.
pub struct StutterAnalyzer {
    differencer: FrameDifferencer,
    detector: AdaptiveDuplicateDetector,
    motion: MotionClassifier,
    aggregator: StutterEventAggregator,
    scorer: SmoothnessScorer,
    tracker: ProgressTracker,
    previous: Option<Frame>,
    classifications: Vec<FrameClassification>,
}

impl StutterAnalyzer {
    /// Create an analyzer with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::InvalidConfiguration`] if any option is out of
    /// range.
    pub fn new(options: &AnalysisOptions) -> Result<Self, JudderError> {
        options.validate()?;
        log::debug!("Creating analyzer: {options:?}");

        Ok(Self {
            differencer: FrameDifferencer::new(options.pixel_tolerance),
            detector: AdaptiveDuplicateDetector::new(&options.duplicate),
            motion: MotionClassifier::new(&options.motion),
            aggregator: StutterEventAggregator::new(options.gap_threshold),
            scorer: SmoothnessScorer::new(options.scoring.clone()),
            tracker: ProgressTracker::new(
                options.progress.clone(),
                OperationType::FrameAnalysis,
                options.expected_frames,
                options.batch_size,
            ),
            previous: None,
            classifications: Vec::new(),
        })
    }

    /// Classify the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::DecodeInput`] if the frame is malformed,
    /// changes resolution, or is timestamped before its predecessor. The
    /// analyzer state is unchanged in that case.
    pub fn push(&mut self, frame: Frame) -> Result<&FrameClassification, JudderError> {
        let index = self.classifications.len() as u64;
        frame.check(index)?;

        let classification = match &self.previous {
            None => FrameClassification {
                index,
                timestamp: frame.timestamp(),
                frame_time: None,
                diff_score: None,
                threshold: None,
                activity: None,
                is_duplicate: false,
                is_moving: false,
                is_stutter: false,
                is_discontinuity: false,
            },
            Some(previous) => {
                if frame.timestamp() < previous.timestamp() {
                    return Err(JudderError::decode_input(
                        index,
                        format!(
                            "timestamp {:?} precedes previous frame at {:?}",
                            frame.timestamp(),
                            previous.timestamp()
                        ),
                    ));
                }
                let diff_score = self.differencer.difference(previous, &frame, index)?;
                let frame_time = frame.timestamp() - previous.timestamp();

                let duplicate = self.detector.observe(diff_score);
                let motion = self.motion.observe(
                    diff_score,
                    duplicate.is_duplicate,
                    self.detector.threshold().value(),
                );
                let is_discontinuity = !self.aggregator.is_valid_interval(frame_time);

                FrameClassification {
                    index,
                    timestamp: frame.timestamp(),
                    frame_time: Some(frame_time),
                    diff_score: Some(diff_score),
                    threshold: Some(duplicate.threshold),
                    activity: motion.activity,
                    is_duplicate: duplicate.is_duplicate,
                    is_moving: motion.is_moving,
                    is_stutter: duplicate.is_duplicate && motion.is_moving,
                    is_discontinuity,
                }
            }
        };

        self.aggregator
            .record(&classification, self.motion.mean_activity());
        self.tracker.advance(Checkpoint {
            index: Some(index),
            timestamp: Some(classification.timestamp),
            duplicate_frames: self.aggregator.duplicate_frames(),
            stutter_frames: self.aggregator.stutter_frames(),
        });
        self.previous = Some(frame);
        self.classifications.push(classification);

        Ok(&self.classifications[index as usize])
    }

    /// Frames classified so far.
    pub fn frames_analyzed(&self) -> u64 {
        self.classifications.len() as u64
    }

    /// Classifications so far.
    pub fn classifications(&self) -> &[FrameClassification] {
        &self.classifications
    }

    /// Build a report over the frames classified so far.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::InsufficientData`] if no frame was analyzed.
    pub fn report(&self) -> Result<AnalysisReport, JudderError> {
        self.build_report(false)
    }

    /// Consume the analyzer and build the final report.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::InsufficientData`] if no frame was analyzed.
    pub fn finish(mut self) -> Result<AnalysisReport, JudderError> {
        self.tracker.finish();
        self.build_report(false)
    }

    pub(crate) fn finish_cancelled(mut self) -> Result<AnalysisReport, JudderError> {
        self.tracker.finish();
        self.build_report(true)
    }

    fn build_report(&self, cancelled: bool) -> Result<AnalysisReport, JudderError> {
        let total_frames = self.frames_analyzed();
        if total_frames == 0 {
            return Err(JudderError::InsufficientData { frames: 0 });
        }

        let metrics = self.aggregator.metrics();
        let smoothness_score = metrics
            .as_ref()
            .and_then(|metrics| self.scorer.score_metrics(metrics));

        Ok(AnalysisReport {
            total_frames,
            classifications: self.classifications.clone(),
            stutter_events: self.aggregator.events(),
            metrics,
            smoothness_score,
            timing: FrameTimingAnalysis::from_frame_times(self.aggregator.frame_times()),
            cancelled,
        })
    }
}

/// Analyze a frame sequence with default options.
///
/// See [`analyze_with_options`].
pub fn analyze<I>(frames: I) -> Result<AnalysisReport, JudderError>
where
    I: IntoIterator<Item = Result<Frame, JudderError>>,
{
    analyze_with_options(frames, &AnalysisOptions::default())
}

/// Analyze a frame sequence in a single forward pass.
///
/// The sequence is consumed lazily; frames are dropped as soon as their
/// successor has been compared against them. If the options carry a
/// cancellation token that fires, iteration stops at the next frame
/// boundary and the report covers the frames analyzed so far with
/// [`cancelled`](AnalysisReport::cancelled) set.
///
/// # Errors
///
/// - [`JudderError::InsufficientData`] if the sequence yields no frames.
/// - [`JudderError::DecodeInput`] for the first malformed frame or
///   per-frame source error, tagged with the frame index.
/// - Source errors that are not about a frame ([`JudderError::FileOpen`],
///   [`JudderError::NoVideoStream`]) unchanged.
/// - [`JudderError::InvalidConfiguration`] for out-of-range options.
pub fn analyze_with_options<I>(
    frames: I,
    options: &AnalysisOptions,
) -> Result<AnalysisReport, JudderError>
where
    I: IntoIterator<Item = Result<Frame, JudderError>>,
{
    let mut analyzer = StutterAnalyzer::new(options)?;

    for frame in frames {
        if options.is_cancelled() {
            log::info!(
                "Analysis cancelled after {} frame(s)",
                analyzer.frames_analyzed()
            );
            return analyzer.finish_cancelled();
        }

        let index = analyzer.frames_analyzed();
        let frame = frame.map_err(|error| tag_source_error(error, index))?;
        analyzer.push(frame)?;
    }

    let report = analyzer.finish()?;
    log::info!(
        "Analyzed {} frame(s): {} duplicate(s), {} stutter event(s)",
        report.total_frames,
        report.metrics.as_ref().map_or(0, |m| m.duplicate_frames),
        report.stutter_events.len()
    );
    Ok(report)
}

/// Attach the frame index to an error raised by a frame source.
///
/// Errors that are not about a particular frame pass through unchanged.
pub(crate) fn tag_source_error(error: JudderError, frame_index: u64) -> JudderError {
    match error {
        JudderError::DecodeInput { .. }
        | JudderError::FileOpen { .. }
        | JudderError::NoVideoStream
        | JudderError::Cancelled => error,
        other => JudderError::decode_input(frame_index, other.to_string()),
    }
}
