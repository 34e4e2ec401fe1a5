//! Parallel analysis of several recordings.
//!
//! [`analyze_batch`] spreads independent recordings across the [`rayon`]
//! thread pool. Every worker opens its own frame source and runs its own
//! [`StutterAnalyzer`](crate::StutterAnalyzer), so no state is shared
//! between recordings.
//!
//! # Example
//!
//! ```no_run
//! use judder::{AnalysisOptions, ImageSequence};
//!
//! let options = AnalysisOptions::new();
//! let sources: Vec<_> = ["run_a/", "run_b/"]
//!     .into_iter()
//!     .map(|dir| {
//!         let options = options.clone();
//!         move || ImageSequence::open(dir, 60.0, &options)
//!     })
//!     .collect();
//!
//! for report in judder::analyze_batch(sources, &options) {
//!     println!("{:?}", report?.smoothness_score);
//! }
//! # Ok::<(), judder::JudderError>(())
//! ```

use std::sync::{Arc, Mutex};

use ::rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::analyzer::{AnalysisReport, analyze_with_options};
use crate::configuration::AnalysisOptions;
use crate::error::JudderError;
use crate::frame::Frame;
use crate::progress::{Checkpoint, NoOpProgress, OperationType, ProgressTracker};

/// Analyze several recordings in parallel.
///
/// Each element of `sources` opens one recording. Results come back in the
/// same order as `sources`; a failure in one recording does not affect the
/// others. The progress callback of `options` is notified once per finished
/// recording ([`OperationType::BatchAnalysis`]); the cancellation token is
/// shared by all workers, and recordings not yet started when it fires
/// return [`JudderError::Cancelled`].
pub fn analyze_batch<F, I>(
    sources: Vec<F>,
    options: &AnalysisOptions,
) -> Vec<Result<AnalysisReport, JudderError>>
where
    F: FnOnce() -> Result<I, JudderError> + Send,
    I: IntoIterator<Item = Result<Frame, JudderError>>,
{
    log::debug!("Analyzing {} recording(s) in parallel", sources.len());

    let tracker = Mutex::new(ProgressTracker::new(
        options.progress.clone(),
        OperationType::BatchAnalysis,
        Some(sources.len() as u64),
        1,
    ));
    let worker_options = options.clone().with_progress(Arc::new(NoOpProgress));

    let results: Vec<Result<AnalysisReport, JudderError>> = sources
        .into_par_iter()
        .enumerate()
        .map(|(index, open)| {
            if worker_options.is_cancelled() {
                return Err(JudderError::Cancelled);
            }
            let result = open().and_then(|frames| analyze_with_options(frames, &worker_options));
            if let Err(error) = &result {
                log::warn!("Recording {index} failed: {error}");
            }
            if let Ok(mut tracker) = tracker.lock() {
                tracker.advance(Checkpoint {
                    index: Some(index as u64),
                    ..Checkpoint::default()
                });
            }
            result
        })
        .collect();

    if let Ok(mut tracker) = tracker.lock() {
        tracker.finish();
    }
    results
}
