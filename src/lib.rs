//! # judder
//!
//! Judge how smoothly a gameplay recording plays back.
//!
//! A capture that runs at a steady 60 fps can still look choppy: when the
//! game misses a frame, the recorder repeats the previous image. `judder`
//! finds those repeated frames, tells apart a repeat that interrupts motion
//! (a stutter) from a repeat of a still picture (a pause menu, a loading
//! screen), and condenses the result into frame-time metrics and a 0–100
//! smoothness score.
//!
//! ## Quick Start
//!
//! ### Analyze a Video File
//!
//! ```no_run
//! # #[cfg(feature = "decode")]
//! # {
//! use judder::{AnalysisOptions, VideoSource};
//!
//! let options = AnalysisOptions::new();
//! let report = judder::analyze_with_options(VideoSource::open("run.mp4", &options)?, &options)?;
//! println!("{report}");
//! # }
//! # Ok::<(), judder::JudderError>(())
//! ```
//!
//! ### Analyze Frames You Already Have
//!
//! ```
//! use std::time::Duration;
//!
//! use judder::{Frame, JudderError};
//!
//! let frames = (0..120u64).map(|index| {
//!     let luma = vec![(index % 2 * 40) as u8; 64];
//!     Ok::<_, JudderError>(Frame::from_luma(8, 8, luma, Duration::from_micros(index * 16_667)))
//! });
//!
//! let report = judder::analyze(frames)?;
//! assert!(report.stutter_events.is_empty());
//! println!("{}", report.to_json());
//! # Ok::<(), JudderError>(())
//! ```
//!
//! ## How It Works
//!
//! - **Frame differencing**: mean absolute luma difference between
//!   consecutive frames at a reduced analysis resolution
//! - **Adaptive duplicate detection**: the threshold follows an exponential
//!   moving average of recent differences, so compression noise in one
//!   recording is not mistaken for motion in another
//! - **Motion classification**: the median of recent content changes
//!   decides whether a duplicate interrupted motion
//! - **Event aggregation**: contiguous stutter frames become one event;
//!   timestamp gaps are kept out of frame-rate statistics
//! - **Scoring**: stutter frequency and frame-rate shortfall reduce a
//!   100-point score
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `decode` | `VideoSource`: decode video files through FFmpeg |
//! | `async` | `FrameStream` and `analyze_stream` via Tokio |
//! | `rayon` | `analyze_batch` spreads recordings across rayon threads |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! The `decode` feature needs the FFmpeg development libraries installed on
//! your system. Everything else is pure Rust.

pub mod aggregate;
pub mod analyzer;
pub mod configuration;
#[cfg(feature = "decode")]
pub mod decode;
pub mod difference;
pub mod duplicate;
pub mod error;
#[cfg(feature = "decode")]
pub mod ffmpeg;
pub mod frame;
pub mod motion;
#[cfg(feature = "rayon")]
mod parallel;
pub mod progress;
pub mod report;
pub mod score;
pub mod sequence;
#[cfg(feature = "async")]
pub mod stream;
pub mod timing;

pub use aggregate::{EffectiveFrameTimes, Metrics, StutterEvent, StutterEventAggregator};
pub use analyzer::{
    AnalysisReport, FrameClassification, StutterAnalyzer, analyze, analyze_with_options,
};
pub use configuration::{
    AnalysisOptions, DEFAULT_ANALYSIS_HEIGHT, DEFAULT_ANALYSIS_WIDTH, DuplicateDetectionOptions,
    MotionOptions, ScoringOptions,
};
#[cfg(feature = "decode")]
pub use decode::VideoSource;
pub use difference::FrameDifferencer;
pub use duplicate::{AdaptiveDuplicateDetector, AdaptiveThreshold, DuplicateDecision};
pub use error::JudderError;
#[cfg(feature = "decode")]
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::Frame;
pub use motion::{MotionClassifier, MotionDecision};
#[cfg(feature = "rayon")]
pub use parallel::analyze_batch;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use report::SmoothnessRating;
pub use score::{ScoreInputs, SmoothnessScorer};
pub use sequence::ImageSequence;
#[cfg(feature = "async")]
pub use stream::{DEFAULT_CHANNEL_CAPACITY, FrameStream, analyze_stream};
pub use timing::FrameTimingAnalysis;
