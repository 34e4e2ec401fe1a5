//! Error types for the `judder` crate.
//!
//! This module defines [`JudderError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context (frame
//! indices, paths, upstream messages) to be surfaced to an end user without
//! additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

#[cfg(feature = "decode")]
use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `judder` operations.
///
/// Every public method that can fail returns `Result<T, JudderError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JudderError {
    /// Too few frames were analyzed for the requested result.
    ///
    /// An empty sequence never produces a report, and a single frame never
    /// produces metrics or a score. This is distinct from a zero-stutter
    /// result: a video with no frames is not "perfectly smooth".
    #[error("Insufficient data: {frames} frame(s) analyzed, at least 2 are required")]
    InsufficientData {
        /// Number of frames that were available.
        frames: u64,
    },

    /// The frame source handed the analyzer an invalid frame.
    ///
    /// Raised for zero-sized or truncated buffers, resolution changes,
    /// timestamps that go backwards, and decode failures reported by the
    /// frame source.
    #[error("Invalid input frame {frame_index}: {reason}")]
    DecodeInput {
        /// Index of the offending frame in the input sequence.
        frame_index: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// An analysis option is outside its accepted range.
    #[error("Invalid configuration for {option}: {reason}")]
    InvalidConfiguration {
        /// Name of the offending option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the frame source.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[cfg(feature = "decode")]
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while loading frames.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

#[cfg(feature = "decode")]
impl From<FfmpegError> for JudderError {
    fn from(error: FfmpegError) -> Self {
        JudderError::FfmpegError(error.to_string())
    }
}

impl JudderError {
    pub(crate) fn decode_input(frame_index: u64, reason: impl Into<String>) -> Self {
        JudderError::DecodeInput {
            frame_index,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        JudderError::InvalidConfiguration {
            option,
            reason: reason.into(),
        }
    }
}
