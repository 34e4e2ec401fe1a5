//! Report rendering.
//!
//! An [`AnalysisReport`] renders two ways: as a human-readable summary via
//! [`Display`](std::fmt::Display), and as a JSON document via
//! [`AnalysisReport::to_json`]. The JSON keys are stable:
//!
//! ```text
//! smoothness_score, total_frames, duration, fps, cancelled,
//! duplicate_detection { duplicate_frames, duplicate_ratio, moving_frames, stutter_frames },
//! frame_times_ms { average, one_percent_low, point_one_percent_low, maximum },
//! capture_frame_times_ms { ... same keys ... },
//! smoothness { avg_to_1pct_ratio, rating },
//! timing { is_vfr, mean_fps, min_fps, max_fps, intervals_analyzed },
//! stutter_events [ { frame_index, timestamp, frametime_ms, duplicate_count, motion_before } ]
//! ```
//!
//! `frame_times_ms` holds effective frame times (how long each distinct
//! image stayed on screen); `capture_frame_times_ms` holds the raw capture
//! intervals. Values that could not be computed are `null`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use serde_json::{Value, json};

use crate::aggregate::StutterEvent;
use crate::analyzer::AnalysisReport;

/// Number of stutter events listed in the text report.
const TEXT_REPORT_EVENT_LIMIT: usize = 10;

/// Qualitative reading of the average-to-1%-low frame time ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothnessRating {
    /// Ratio above 0.9: very consistent frame times.
    Excellent,
    /// Ratio above 0.7: minor frame time variance.
    Good,
    /// Ratio above 0.5: noticeable stutter.
    Fair,
    /// Anything lower: significant stutter.
    Poor,
}

impl SmoothnessRating {
    /// Rate an average-to-1%-low ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.9 {
            SmoothnessRating::Excellent
        } else if ratio > 0.7 {
            SmoothnessRating::Good
        } else if ratio > 0.5 {
            SmoothnessRating::Fair
        } else {
            SmoothnessRating::Poor
        }
    }

    /// One-line description.
    pub fn description(self) -> &'static str {
        match self {
            SmoothnessRating::Excellent => "Excellent: very consistent frame times",
            SmoothnessRating::Good => "Good: minor frame time variance",
            SmoothnessRating::Fair => "Fair: noticeable stutter",
            SmoothnessRating::Poor => "Poor: significant stutter",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SmoothnessRating::Excellent => "excellent",
            SmoothnessRating::Good => "good",
            SmoothnessRating::Fair => "fair",
            SmoothnessRating::Poor => "poor",
        }
    }
}

impl AnalysisReport {
    /// Rating of the effective frame-time consistency, if measured.
    pub fn rating(&self) -> Option<SmoothnessRating> {
        self.metrics
            .as_ref()
            .and_then(|metrics| metrics.effective.as_ref())
            .map(|effective| SmoothnessRating::from_ratio(effective.average_to_one_percent_ratio))
    }

    /// Stutter events ordered from longest to shortest.
    pub fn worst_stutter_events(&self) -> Vec<&StutterEvent> {
        let mut events: Vec<&StutterEvent> = self.stutter_events.iter().collect();
        events.sort_by(|a, b| b.duration.cmp(&a.duration));
        events
    }

    /// Render the report as a JSON document.
    pub fn to_json(&self) -> Value {
        let metrics = self.metrics.as_ref();
        let effective = metrics.and_then(|m| m.effective.as_ref());

        json!({
            "smoothness_score": self.smoothness_score.map(|score| round(score, 1)),
            "total_frames": self.total_frames,
            "duration": metrics.map(|m| round(m.duration.as_secs_f64(), 3)),
            "fps": metrics.and_then(|m| m.average_fps).map(|fps| round(fps, 2)),
            "cancelled": self.cancelled,
            "duplicate_detection": {
                "duplicate_frames": metrics.map_or(0, |m| m.duplicate_frames),
                "duplicate_ratio": metrics.map(|m| round(m.duplicate_ratio, 4)),
                "moving_frames": metrics.map_or(0, |m| m.moving_frames),
                "stutter_frames": metrics.map_or(0, |m| m.stutter_frames),
            },
            "frame_times_ms": {
                "average": effective.map(|e| millis(e.average)),
                "one_percent_low": effective.map(|e| millis(e.one_percent_low)),
                "point_one_percent_low": effective.map(|e| millis(e.point_one_percent_low)),
                "maximum": effective.map(|e| millis(e.maximum)),
            },
            "capture_frame_times_ms": {
                "average": metrics.and_then(|m| m.average_frame_time).map(millis),
                "one_percent_low": metrics.and_then(|m| m.one_percent_low_frame_time).map(millis),
                "point_one_percent_low": metrics
                    .and_then(|m| m.point_one_percent_low_frame_time)
                    .map(millis),
                "maximum": metrics.and_then(|m| m.max_frame_time).map(millis),
            },
            "smoothness": {
                "avg_to_1pct_ratio": effective.map(|e| round(e.average_to_one_percent_ratio, 4)),
                "rating": self.rating().map(SmoothnessRating::label),
            },
            "timing": {
                "is_vfr": self.timing.is_vfr,
                "mean_fps": round(self.timing.mean_fps, 2),
                "min_fps": round(self.timing.min_fps, 2),
                "max_fps": round(self.timing.max_fps, 2),
                "intervals_analyzed": self.timing.intervals_analyzed,
            },
            "stutter_events": self
                .stutter_events
                .iter()
                .map(|event| json!({
                    "frame_index": event.frame_index,
                    "timestamp": round(event.timestamp.as_secs_f64(), 3),
                    "frametime_ms": round(event.frame_time_ms(), 2),
                    "duplicate_count": event.duplicate_count,
                    "motion_before": round(event.motion_before, 2),
                }))
                .collect::<Vec<_>>(),
        })
    }
}

impl Display for AnalysisReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let rule = "=".repeat(60);
        let section = "-".repeat(40);

        writeln!(f, "{rule}")?;
        writeln!(f, "FRAME TIME ANALYSIS")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "Total Frames: {}", self.total_frames)?;
        if let Some(metrics) = &self.metrics {
            writeln!(f, "Duration: {:.2}s", metrics.duration.as_secs_f64())?;
            if let Some(fps) = metrics.average_fps {
                writeln!(f, "FPS: {fps:.2}")?;
            }
        }
        if self.cancelled {
            writeln!(f, "(cancelled: partial results)")?;
        }

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        match self.smoothness_score {
            Some(score) => writeln!(f, "SMOOTHNESS SCORE: {score:.1}/100")?,
            None => writeln!(f, "SMOOTHNESS SCORE: n/a (not enough frame-time data)")?,
        }
        writeln!(f, "{rule}")?;

        let Some(metrics) = &self.metrics else {
            return writeln!(f, "\nAt least two frames are needed for frame-time metrics.");
        };

        writeln!(f, "\nDuplicate Frame Detection:")?;
        writeln!(f, "{section}")?;
        writeln!(
            f,
            "  Duplicate frames: {} ({:.1}%)",
            metrics.duplicate_frames,
            metrics.duplicate_ratio * 100.0
        )?;

        if let Some(effective) = &metrics.effective {
            writeln!(f, "\nFrame Time Metrics:")?;
            writeln!(f, "{section}")?;
            write_frame_time(f, "Average:   ", effective.average)?;
            write_frame_time(f, "1% Low:    ", effective.one_percent_low)?;
            write_frame_time(f, "0.1% Low:  ", effective.point_one_percent_low)?;
            writeln!(f, "  Maximum:    {:.2} ms", millis(effective.maximum))?;

            writeln!(f, "\nSmoothness Analysis:")?;
            writeln!(f, "{section}")?;
            writeln!(
                f,
                "  1% Low / Avg ratio: {:.2}%",
                effective.average_to_one_percent_ratio * 100.0
            )?;
            let rating = SmoothnessRating::from_ratio(effective.average_to_one_percent_ratio);
            writeln!(f, "  -> {}", rating.description())?;
        }

        if metrics.discontinuities > 0 {
            writeln!(
                f,
                "\n{} capture gap(s) excluded from frame-rate statistics",
                metrics.discontinuities
            )?;
        }
        if self.timing.is_vfr {
            writeln!(
                f,
                "Variable frame rate: {:.1}-{:.1} FPS",
                self.timing.min_fps, self.timing.max_fps
            )?;
        }

        if self.stutter_events.is_empty() {
            writeln!(f, "\nNo stutters detected (no duplicates during motion)!")?;
        } else {
            writeln!(
                f,
                "\nStutter Events (duplicates during motion): {}",
                self.stutter_events.len()
            )?;
            writeln!(f, "{section}")?;
            for (rank, event) in self
                .worst_stutter_events()
                .into_iter()
                .take(TEXT_REPORT_EVENT_LIMIT)
                .enumerate()
            {
                writeln!(
                    f,
                    "  [{}] @ {:.2}s: {:.0}ms ({} dup, motion={:.1})",
                    rank + 1,
                    event.timestamp.as_secs_f64(),
                    event.frame_time_ms(),
                    event.duplicate_count,
                    event.motion_before
                )?;
            }
            if self.stutter_events.len() > TEXT_REPORT_EVENT_LIMIT {
                writeln!(
                    f,
                    "  ... and {} more",
                    self.stutter_events.len() - TEXT_REPORT_EVENT_LIMIT
                )?;
            }
            writeln!(f, "\n  Total stutter frames: {}", metrics.stutter_frames)?;
        }

        writeln!(f, "\n{rule}")
    }
}

fn write_frame_time(f: &mut Formatter<'_>, label: &str, time: Duration) -> FmtResult {
    let fps = if time.is_zero() {
        0.0
    } else {
        1.0 / time.as_secs_f64()
    };
    writeln!(f, "  {label} {:.2} ms ({fps:.1} FPS)", millis(time))
}

fn millis(time: Duration) -> f64 {
    round(time.as_secs_f64() * 1000.0, 2)
}

fn round(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}
