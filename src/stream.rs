//! Async frame streaming and analysis.
//!
//! [`FrameStream`] runs any blocking frame source (the FFmpeg decoder, an
//! image sequence, a synthetic generator) on a `tokio::task::spawn_blocking`
//! thread and hands frames back through a bounded channel. The channel
//! capacity bounds how far decoding can run ahead of analysis, so a slow
//! consumer applies backpressure instead of letting decoded frames pile up.
//!
//! [`analyze_stream`] consumes any such stream with a [`StutterAnalyzer`].
//!
//! # Example
//!
//! ```no_run
//! use judder::{AnalysisOptions, FrameStream, ImageSequence, JudderError};
//!
//! # async fn example() -> Result<(), JudderError> {
//! let options = AnalysisOptions::new();
//! let source_options = options.clone();
//! let stream = FrameStream::spawn(move || ImageSequence::open("capture/", 60.0, &source_options));
//! let report = judder::analyze_stream(stream, &options).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc::{self, Receiver};
use tokio_stream::{Stream, StreamExt};

use crate::analyzer::{AnalysisReport, StutterAnalyzer, tag_source_error};
use crate::configuration::AnalysisOptions;
use crate::error::JudderError;
use crate::frame::Frame;

/// Default bounded-channel capacity for [`FrameStream`].
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// A stream of frames produced by a background thread.
///
/// Dropping the stream closes the channel, which stops the producer at the
/// next frame boundary.
pub struct FrameStream {
    receiver: Receiver<Result<Frame, JudderError>>,
}

impl FrameStream {
    /// Spawn a producer with the default channel capacity.
    ///
    /// `open` runs on the blocking thread, so sources that cannot be moved
    /// between threads (such as an FFmpeg decoder) are created there.
    pub fn spawn<F, I>(open: F) -> Self
    where
        F: FnOnce() -> Result<I, JudderError> + Send + 'static,
        I: IntoIterator<Item = Result<Frame, JudderError>> + 'static,
    {
        Self::spawn_with_capacity(open, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Spawn a producer with an explicit channel capacity (minimum 1).
    pub fn spawn_with_capacity<F, I>(open: F, capacity: usize) -> Self
    where
        F: FnOnce() -> Result<I, JudderError> + Send + 'static,
        I: IntoIterator<Item = Result<Frame, JudderError>> + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        tokio::task::spawn_blocking(move || {
            let frames = match open() {
                Ok(frames) => frames,
                Err(error) => {
                    let _ = sender.blocking_send(Err(error));
                    return;
                }
            };

            for frame in frames {
                let failed = frame.is_err();
                if sender.blocking_send(frame).is_err() {
                    log::debug!("Frame stream receiver dropped; stopping producer");
                    return;
                }
                if failed {
                    return;
                }
            }
        });

        FrameStream { receiver }
    }
}

impl Stream for FrameStream {
    type Item = Result<Frame, JudderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Analyze a stream of frames.
///
/// Behaves like [`analyze_with_options`](crate::analyze_with_options):
/// cancellation yields a partial report, and the first source error or
/// invalid frame aborts the run.
pub async fn analyze_stream<S>(
    mut frames: S,
    options: &AnalysisOptions,
) -> Result<AnalysisReport, JudderError>
where
    S: Stream<Item = Result<Frame, JudderError>> + Unpin,
{
    let mut analyzer = StutterAnalyzer::new(options)?;

    while let Some(frame) = frames.next().await {
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

    analyzer.finish()
}
