//! Stutter event aggregation and frame-time metrics.
//!
//! [`StutterEventAggregator`] consumes per-frame classifications in order
//! and keeps the running aggregates the report is built from: duplicate and
//! stutter counts, capture intervals, effective frame times, and the list of
//! [`StutterEvent`]s.
//!
//! Contiguous stutter frames are coalesced: one event per uninterrupted run
//! of frames that are both duplicates and moving. Each event records how
//! many frames it spans.
//!
//! Capture intervals longer than the configured gap threshold (or not
//! strictly positive) are discontinuities: they are left out of the
//! frame-rate statistics but their frames are still classified and counted.

use std::time::Duration;

use crate::analyzer::FrameClassification;
use crate::timing::{mean_duration, percentile};

/// A run of repeated frames that occurred while the content was animating.
#[derive(Debug, Clone, PartialEq)]
pub struct StutterEvent {
    /// Index of the first stutter frame in the run.
    pub frame_index: u64,
    /// Capture timestamp of the first stutter frame.
    pub timestamp: Duration,
    /// Number of consecutive stutter frames in the run.
    pub duplicate_count: u64,
    /// How long the frozen image stayed on screen: from the last distinct
    /// frame before the run until the frame that ended it.
    pub duration: Duration,
    /// Mean difference score of the recent content changes before the run.
    pub motion_before: f64,
}

impl StutterEvent {
    /// Duration in milliseconds, as shown in reports.
    pub fn frame_time_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Statistics over effective frame times.
///
/// An effective frame time is how long one distinct image stayed on screen:
/// duplicates extend the preceding distinct frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveFrameTimes {
    /// Mean effective frame time.
    pub average: Duration,
    /// Effective frame time at the 99th percentile.
    pub one_percent_low: Duration,
    /// Effective frame time at the 99.9th percentile.
    pub point_one_percent_low: Duration,
    /// Longest effective frame time.
    pub maximum: Duration,
    /// `average / one_percent_low`; 1.0 means perfectly even pacing.
    pub average_to_one_percent_ratio: f64,
    /// Number of effective frame times measured.
    pub samples: u64,
}

/// Aggregated results of an analysis run.
///
/// Available once at least two frames were analyzed. Frame-rate fields are
/// `None` when no capture interval survived discontinuity filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Frames analyzed, including the first.
    pub total_frames: u64,
    /// Capture intervals used for frame-rate statistics.
    pub valid_intervals: u64,
    /// Capture intervals excluded as discontinuities.
    pub discontinuities: u64,
    /// Time between the first and last frame.
    pub duration: Duration,
    /// Mean frame rate over valid intervals.
    pub average_fps: Option<f64>,
    /// Mean capture interval over valid intervals.
    pub average_frame_time: Option<Duration>,
    /// Capture interval at the 99th percentile.
    pub one_percent_low_frame_time: Option<Duration>,
    /// Capture interval at the 99.9th percentile.
    pub point_one_percent_low_frame_time: Option<Duration>,
    /// Longest valid capture interval.
    pub max_frame_time: Option<Duration>,
    /// Frames classified as duplicates, regardless of motion.
    pub duplicate_frames: u64,
    /// `duplicate_frames` over evaluated frames (all but the first).
    pub duplicate_ratio: f64,
    /// Frames classified as moving, duplicates included.
    pub moving_frames: u64,
    /// Number of coalesced stutter events.
    pub stutter_events: u64,
    /// Frames that were both duplicates and moving.
    pub stutter_frames: u64,
    /// Effective frame-time statistics, if any were measured.
    pub effective: Option<EffectiveFrameTimes>,
}

impl Metrics {
    /// The 1%-low expressed as a frame rate.
    pub fn one_percent_low_fps(&self) -> Option<f64> {
        self.one_percent_low_frame_time
            .filter(|time| !time.is_zero())
            .map(|time| 1.0 / time.as_secs_f64())
    }
}

#[derive(Debug, Clone)]
struct OpenEvent {
    frame_index: u64,
    timestamp: Duration,
    duplicate_count: u64,
    frozen_since: Duration,
    motion_before: f64,
}

impl OpenEvent {
    fn close(&self, end: Duration) -> StutterEvent {
        StutterEvent {
            frame_index: self.frame_index,
            timestamp: self.timestamp,
            duplicate_count: self.duplicate_count,
            duration: end.saturating_sub(self.frozen_since),
            motion_before: self.motion_before,
        }
    }
}

/// Folds frame classifications into metrics and stutter events.
#[derive(Debug, Clone)]
pub struct StutterEventAggregator {
    gap_threshold: Duration,
    total_frames: u64,
    first_timestamp: Option<Duration>,
    last_timestamp: Option<Duration>,
    last_valid_interval: Option<Duration>,
    frame_times: Vec<Duration>,
    discontinuities: u64,
    duplicate_frames: u64,
    moving_frames: u64,
    stutter_frames: u64,
    last_distinct_timestamp: Option<Duration>,
    gap_since_distinct: bool,
    trailing_duplicates: u64,
    effective_frame_times: Vec<Duration>,
    events: Vec<StutterEvent>,
    open_event: Option<OpenEvent>,
}

impl StutterEventAggregator {
    /// Create an empty aggregator.
    pub fn new(gap_threshold: Duration) -> Self {
        Self {
            gap_threshold,
            total_frames: 0,
            first_timestamp: None,
            last_timestamp: None,
            last_valid_interval: None,
            frame_times: Vec::new(),
            discontinuities: 0,
            duplicate_frames: 0,
            moving_frames: 0,
            stutter_frames: 0,
            last_distinct_timestamp: None,
            gap_since_distinct: false,
            trailing_duplicates: 0,
            effective_frame_times: Vec::new(),
            events: Vec::new(),
            open_event: None,
        }
    }

    /// Whether a capture interval counts towards frame-rate statistics.
    pub fn is_valid_interval(&self, interval: Duration) -> bool {
        !interval.is_zero() && interval <= self.gap_threshold
    }

    /// Fold in the next frame.
    ///
    /// `motion_before` is the motion classifier's mean activity at this
    /// frame; it is stored on a stutter event when one opens here.
    pub fn record(&mut self, frame: &FrameClassification, motion_before: f64) {
        self.total_frames += 1;
        if self.first_timestamp.is_none() {
            self.first_timestamp = Some(frame.timestamp);
        }
        self.last_timestamp = Some(frame.timestamp);

        if let Some(interval) = frame.frame_time {
            if self.is_valid_interval(interval) {
                self.frame_times.push(interval);
                self.last_valid_interval = Some(interval);
            } else {
                log::warn!(
                    "Frame {}: interval of {:?} excluded from frame-rate statistics",
                    frame.index,
                    interval
                );
                self.discontinuities += 1;
                self.gap_since_distinct = true;
            }
        }

        if frame.is_moving {
            self.moving_frames += 1;
        }
        if frame.is_stutter {
            self.stutter_frames += 1;
            match &mut self.open_event {
                Some(event) => event.duplicate_count += 1,
                None => {
                    let frozen_since = self.last_distinct_timestamp.unwrap_or(frame.timestamp);
                    log::debug!("Stutter event opened at frame {}", frame.index);
                    self.open_event = Some(OpenEvent {
                        frame_index: frame.index,
                        timestamp: frame.timestamp,
                        duplicate_count: 1,
                        frozen_since,
                        motion_before,
                    });
                }
            }
        } else if let Some(event) = self.open_event.take() {
            let closed = event.close(frame.timestamp);
            log::debug!(
                "Stutter event closed at frame {} ({} frames, {:.1} ms)",
                frame.index,
                closed.duplicate_count,
                closed.frame_time_ms()
            );
            self.events.push(closed);
        }

        if frame.is_duplicate {
            self.duplicate_frames += 1;
            self.trailing_duplicates += 1;
        } else {
            if let Some(previous) = self.last_distinct_timestamp
                && !self.gap_since_distinct
            {
                self.effective_frame_times
                    .push(frame.timestamp.saturating_sub(previous));
            }
            self.last_distinct_timestamp = Some(frame.timestamp);
            self.gap_since_distinct = false;
            self.trailing_duplicates = 0;
        }
    }

    /// Frames folded in so far.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn duplicate_frames(&self) -> u64 {
        self.duplicate_frames
    }

    pub fn stutter_frames(&self) -> u64 {
        self.stutter_frames
    }

    /// Valid capture intervals so far, in input order.
    pub fn frame_times(&self) -> &[Duration] {
        &self.frame_times
    }

    /// Stutter events so far, including a run still in progress.
    ///
    /// A run that has not ended yet is reported as if it ended one typical
    /// interval after the latest frame.
    pub fn events(&self) -> Vec<StutterEvent> {
        let mut events = self.events.clone();
        if let (Some(event), Some(end)) = (&self.open_event, self.projected_end()) {
            events.push(event.close(end));
        }
        events
    }

    /// Metrics over everything folded in so far, or `None` with fewer than
    /// two frames.
    pub fn metrics(&self) -> Option<Metrics> {
        if self.total_frames < 2 {
            return None;
        }

        let first = self.first_timestamp.unwrap_or_default();
        let last = self.last_timestamp.unwrap_or_default();

        let mut sorted = self.frame_times.clone();
        sorted.sort();

        let average_frame_time = mean_duration(&self.frame_times);
        let average_fps = average_frame_time
            .filter(|time| !time.is_zero())
            .map(|time| 1.0 / time.as_secs_f64());

        let evaluated = self.total_frames - 1;
        let stutter_events = self.events.len() as u64 + u64::from(self.open_event.is_some());

        Some(Metrics {
            total_frames: self.total_frames,
            valid_intervals: self.frame_times.len() as u64,
            discontinuities: self.discontinuities,
            duration: last.saturating_sub(first),
            average_fps,
            average_frame_time,
            one_percent_low_frame_time: percentile(&sorted, 0.99),
            point_one_percent_low_frame_time: percentile(&sorted, 0.999),
            max_frame_time: sorted.last().copied(),
            duplicate_frames: self.duplicate_frames,
            duplicate_ratio: self.duplicate_frames as f64 / evaluated as f64,
            moving_frames: self.moving_frames,
            stutter_events,
            stutter_frames: self.stutter_frames,
            effective: self.effective_statistics(),
        })
    }

    fn projected_end(&self) -> Option<Duration> {
        self.last_timestamp
            .map(|last| last + self.last_valid_interval.unwrap_or_default())
    }

    fn effective_statistics(&self) -> Option<EffectiveFrameTimes> {
        let mut samples = self.effective_frame_times.clone();
        if self.trailing_duplicates > 0
            && !self.gap_since_distinct
            && let (Some(since), Some(end)) = (self.last_distinct_timestamp, self.projected_end())
        {
            samples.push(end.saturating_sub(since));
        }
        if samples.is_empty() {
            return None;
        }

        let average = mean_duration(&samples)?;
        samples.sort();
        let one_percent_low = percentile(&samples, 0.99)?;
        let point_one_percent_low = percentile(&samples, 0.999)?;
        let maximum = samples.last().copied()?;
        let average_to_one_percent_ratio = if one_percent_low.is_zero() {
            0.0
        } else {
            average.as_secs_f64() / one_percent_low.as_secs_f64()
        };

        Some(EffectiveFrameTimes {
            average,
            one_percent_low,
            point_one_percent_low,
            maximum,
            average_to_one_percent_ratio,
            samples: samples.len() as u64,
        })
    }
}
