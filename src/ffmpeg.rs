//! FFmpeg console verbosity.
//!
//! FFmpeg logs to stderr on its own, independently of the `log` facade the
//! rest of the crate uses. Decoding a damaged capture can flood the terminal
//! with codec warnings, so the level can be lowered here without depending
//! on `ffmpeg-next` directly.
//!
//! # Example
//!
//! ```no_run
//! use judder::FfmpegLogLevel;
//!
//! judder::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let level: FfmpegLogLevel = "quiet".parse()?;
//! judder::set_ffmpeg_log_level(level);
//! # Ok::<(), judder::JudderError>(())
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::JudderError;

/// FFmpeg log verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// No output.
    Quiet,
    /// Conditions the process cannot survive.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = JudderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(JudderError::invalid_option(
                "log_level",
                format!("unknown FFmpeg log level: {other}"),
            )),
        }
    }
}

/// Set FFmpeg's console verbosity. Does not affect `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
