//! FFmpeg-backed frame source.
//!
//! [`VideoSource`] opens a media file, picks its best video stream, and
//! lazily decodes it into analysis [`Frame`]s: every picture is scaled
//! straight to 8-bit grayscale at the configured analysis resolution by
//! FFmpeg's scaler, and timestamped from its presentation timestamp (PTS)
//! relative to the first decoded picture.
//!
//! Each call to [`next()`](Iterator::next) reads and decodes just enough
//! packets to produce one frame, so memory use does not grow with the
//! length of the recording.
//!
//! # Example
//!
//! ```no_run
//! use judder::{AnalysisOptions, VideoSource};
//!
//! let options = AnalysisOptions::new();
//! let source = VideoSource::open("gameplay.mp4", &options)?;
//! let report = judder::analyze_with_options(source, &options)?;
//! println!("{report}");
//! # Ok::<(), judder::JudderError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::configuration::AnalysisOptions;
use crate::error::JudderError;
use crate::frame::Frame;

/// Frame rate assumed when a stream does not declare one.
const FALLBACK_FRAMES_PER_SECOND: f64 = 30.0;

/// A lazy iterator over the decoded frames of a video file.
pub struct VideoSource {
    path: PathBuf,
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    time_base: Rational,
    frames_per_second: f64,
    estimated_frames: Option<u64>,
    width: u32,
    height: u32,
    decoded: VideoFrame,
    scaled: VideoFrame,
    first_pts: Option<i64>,
    last_timestamp: Option<Duration>,
    frames_emitted: u64,
    eof_sent: bool,
    done: bool,
}

impl VideoSource {
    /// Open `path` and prepare to decode its best video stream.
    ///
    /// # Errors
    ///
    /// - [`JudderError::FileOpen`] if FFmpeg cannot open the file.
    /// - [`JudderError::NoVideoStream`] if the file has no video stream.
    /// - [`JudderError::FfmpegError`] if no decoder or scaler is available.
    pub fn open<P: AsRef<Path>>(path: P, options: &AnalysisOptions) -> Result<Self, JudderError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video: {}", path.display());

        ffmpeg_next::init().map_err(|error| JudderError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| JudderError::FileOpen {
            path: path.clone(),
            reason: error.to_string(),
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(JudderError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let frames_per_second = rational_to_f64(stream.avg_frame_rate())
            .or_else(|| rational_to_f64(stream.rate()))
            .unwrap_or(FALLBACK_FRAMES_PER_SECOND);
        let estimated_frames = u64::try_from(stream.frames()).ok().filter(|&n| n > 0);

        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()
            .map_err(|error| {
                JudderError::VideoDecodeError(format!(
                    "Failed to create video decoder for stream {stream_index}: {error}"
                ))
            })?;

        let (width, height) = options.analysis_resolution();
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::GRAY8,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        log::debug!(
            "Video stream {stream_index}: {}x{} @ {frames_per_second:.2} fps, analysed at {width}x{height}",
            decoder.width(),
            decoder.height()
        );

        Ok(Self {
            path,
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            frames_per_second,
            estimated_frames,
            width,
            height,
            decoded: VideoFrame::empty(),
            scaled: VideoFrame::empty(),
            first_pts: None,
            last_timestamp: None,
            frames_emitted: 0,
            eof_sent: false,
            done: false,
        })
    }

    /// Path of the file being decoded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nominal frame rate declared by the stream.
    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    /// Frame count declared by the container, if any.
    pub fn estimated_frames(&self) -> Option<u64> {
        self.estimated_frames
    }

    /// Timestamp of the picture currently held in `decoded`.
    fn current_timestamp(&mut self) -> Duration {
        match self.decoded.timestamp().or(self.decoded.pts()) {
            Some(pts) => {
                let first = *self.first_pts.get_or_insert(pts);
                let seconds = pts_to_seconds(pts - first, self.time_base);
                Duration::try_from_secs_f64(seconds).unwrap_or_default()
            }
            None => {
                let interval =
                    Duration::try_from_secs_f64(1.0 / self.frames_per_second).unwrap_or_default();
                self.last_timestamp
                    .map_or(Duration::ZERO, |last| last + interval)
            }
        }
    }

    /// Scale the picture held in `decoded` into an analysis frame.
    fn convert_current_frame(&mut self) -> Result<Frame, JudderError> {
        let timestamp = self.current_timestamp();
        self.scaler
            .run(&self.decoded, &mut self.scaled)
            .map_err(|error| JudderError::decode_input(self.frames_emitted, error.to_string()))?;

        let luma = luma_plane(&self.scaled, self.width, self.height);
        self.last_timestamp = Some(timestamp);
        Ok(Frame::from_luma(self.width, self.height, luma, timestamp))
    }

    fn fail(&mut self, error: FfmpegError) -> Option<Result<Frame, JudderError>> {
        self.done = true;
        Some(Err(JudderError::decode_input(
            self.frames_emitted,
            error.to_string(),
        )))
    }
}

impl Iterator for VideoSource {
    type Item = Result<Frame, JudderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                let frame = self.convert_current_frame();
                if frame.is_err() {
                    self.done = true;
                }
                self.frames_emitted += 1;
                return Some(frame);
            }

            if self.eof_sent {
                log::debug!(
                    "Decoded {} frame(s) from {}",
                    self.frames_emitted,
                    self.path.display()
                );
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index
                        && let Err(error) = self.decoder.send_packet(&packet)
                    {
                        return self.fail(error);
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.fail(error);
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    log::debug!("Skipping unreadable packet: {error}");
                }
            }
        }
    }
}

/// Copy a single-plane 8-bit frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width).
fn luma_plane(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_length = width as usize;
    let data = frame.data(0);

    if stride == row_length {
        data[..row_length * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_length]);
        }
        buffer
    }
}

fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

fn rational_to_f64(rate: Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}
