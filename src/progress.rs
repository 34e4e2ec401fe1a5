//! Progress reporting and cooperative cancellation.
//!
//! An analysis run reports a [`ProgressInfo`] snapshot to the configured
//! [`ProgressCallback`] every `batch_size` frames (or every finished
//! recording in a batch), plus once more when the run ends. A
//! [`CancellationToken`] shared with the run stops it at the next frame
//! boundary.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use judder::{AnalysisOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!(
//!             "{} frames, {} duplicates, {} stutter frames",
//!             info.current, info.duplicate_frames, info.stutter_frames
//!         );
//!     }
//! }
//!
//! let options = AnalysisOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(60);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What a progress report is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Frames of a single recording.
    FrameAnalysis,
    /// Finished recordings of a batch.
    BatchAnalysis,
}

/// A snapshot of an analysis run.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    pub operation: OperationType,
    /// Frames (or recordings) processed so far.
    pub current: u64,
    /// Expected count, if the caller supplied one.
    pub total: Option<u64>,
    /// `current / total` as a percentage, when `total` is known and non-zero.
    pub percentage: Option<f32>,
    pub elapsed: Duration,
    /// Extrapolated from the throughput so far; needs `total`.
    pub estimated_remaining: Option<Duration>,
    /// Index of the latest frame (or recording).
    pub current_frame: Option<u64>,
    /// Capture timestamp of the latest frame.
    pub current_timestamp: Option<Duration>,
    /// Duplicate frames seen so far. Always zero for batch reports.
    pub duplicate_frames: u64,
    /// Duplicate frames that fell inside motion so far. Always zero for
    /// batch reports.
    pub stutter_frames: u64,
}

/// Receives progress snapshots.
///
/// Callbacks observe a run but cannot stop it; use a [`CancellationToken`]
/// for that. They may be called from worker threads, hence `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards every snapshot. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// A shared flag that stops analysis at the next frame boundary.
///
/// Clones share the same flag. Frames classified before the flag was
/// observed are still reported, with `cancelled` set on the report.
///
/// ```
/// use judder::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Where a run stands after one more frame or recording.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Checkpoint {
    pub(crate) index: Option<u64>,
    pub(crate) timestamp: Option<Duration>,
    pub(crate) duplicate_frames: u64,
    pub(crate) stutter_frames: u64,
}

/// Counts processed items and forwards a snapshot every `batch_size` items.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    batch_size: u64,
    started: Instant,
    processed: u64,
    latest: Checkpoint,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            batch_size: batch_size.max(1),
            started: Instant::now(),
            processed: 0,
            latest: Checkpoint::default(),
        }
    }

    pub(crate) fn advance(&mut self, checkpoint: Checkpoint) {
        self.processed += 1;
        self.latest = checkpoint;
        if self.processed % self.batch_size == 0 {
            self.emit(checkpoint);
        }
    }

    /// Emit the closing snapshot. Carries the latest counts but no frame
    /// position.
    pub(crate) fn finish(&mut self) {
        self.emit(Checkpoint {
            index: None,
            timestamp: None,
            ..self.latest
        });
    }

    fn emit(&self, checkpoint: Checkpoint) {
        let elapsed = self.started.elapsed();
        let total = self.total.filter(|&total| total > 0);

        let percentage = total.map(|total| self.processed as f32 / total as f32 * 100.0);
        let estimated_remaining = total
            .filter(|_| self.processed > 0)
            .map(|total| {
                let remaining = total.saturating_sub(self.processed);
                elapsed.mul_f64(remaining as f64 / self.processed as f64)
            });

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.processed,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: checkpoint.index,
            current_timestamp: checkpoint.timestamp,
            duplicate_frames: checkpoint.duplicate_frames,
            stutter_frames: checkpoint.stutter_frames,
        });
    }
}
