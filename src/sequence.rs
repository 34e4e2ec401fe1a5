//! Image-sequence frame source.
//!
//! [`ImageSequence`] turns a directory of numbered screenshots or exported
//! frames into a lazy frame iterator. Files are ordered by name, so
//! zero-padded numbering (`frame_000001.png`, ...) is expected. Timestamps
//! are synthesized from a fixed capture rate.
//!
//! # Example
//!
//! ```no_run
//! use judder::{AnalysisOptions, ImageSequence};
//!
//! let options = AnalysisOptions::new();
//! let frames = ImageSequence::open("capture/", 60.0, &options)?;
//! let report = judder::analyze_with_options(frames, &options)?;
//! println!("{report}");
//! # Ok::<(), judder::JudderError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::configuration::AnalysisOptions;
use crate::error::JudderError;
use crate::frame::Frame;

/// File extensions picked up when scanning a directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// A lazily-loaded sequence of image files.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    frames_per_second: f64,
    resolution: (u32, u32),
    position: usize,
}

impl ImageSequence {
    /// Scan `directory` for image files.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::FileOpen`] if the directory cannot be read, or
    /// [`JudderError::InvalidConfiguration`] if `frames_per_second` is not a
    /// positive number.
    pub fn open<P: AsRef<Path>>(
        directory: P,
        frames_per_second: f64,
        options: &AnalysisOptions,
    ) -> Result<Self, JudderError> {
        let directory = directory.as_ref();
        let entries = fs::read_dir(directory).map_err(|error| JudderError::FileOpen {
            path: directory.to_path_buf(),
            reason: error.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        log::debug!(
            "Found {} image(s) in {}",
            paths.len(),
            directory.display()
        );
        Self::from_paths(paths, frames_per_second, options)
    }

    /// Build a sequence from an explicit, already ordered list of files.
    ///
    /// # Errors
    ///
    /// Returns [`JudderError::InvalidConfiguration`] if `frames_per_second`
    /// is not a positive number, or is so small that the last frame's
    /// timestamp cannot be represented.
    pub fn from_paths(
        paths: Vec<PathBuf>,
        frames_per_second: f64,
        options: &AnalysisOptions,
    ) -> Result<Self, JudderError> {
        if !(frames_per_second.is_finite() && frames_per_second > 0.0) {
            return Err(JudderError::invalid_option(
                "frames_per_second",
                format!("must be positive, got {frames_per_second}"),
            ));
        }
        if let Some(last) = paths.len().checked_sub(1) {
            frame_timestamp(last, frames_per_second)?;
        }

        Ok(Self {
            paths,
            frames_per_second,
            resolution: options.analysis_resolution(),
            position: 0,
        })
    }

    /// Total number of images in the sequence.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the sequence holds no images.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The image files, in playback order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn timestamp_of(&self, index: usize) -> Result<Duration, JudderError> {
        frame_timestamp(index, self.frames_per_second)
    }
}

impl Iterator for ImageSequence {
    type Item = Result<Frame, JudderError>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.position;
        let path = self.paths.get(index)?;
        self.position += 1;

        let frame = self.timestamp_of(index).and_then(|timestamp| {
            image::open(path)
                .map(|image| Frame::from_image(&image, timestamp, self.resolution))
                .map_err(|error| {
                    JudderError::decode_input(
                        index as u64,
                        format!("{}: {error}", path.display()),
                    )
                })
        });
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.paths.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ImageSequence {}

fn frame_timestamp(index: usize, frames_per_second: f64) -> Result<Duration, JudderError> {
    Duration::try_from_secs_f64(index as f64 / frames_per_second).map_err(|error| {
        JudderError::invalid_option(
            "frames_per_second",
            format!("frame {index} at {frames_per_second} fps has no valid timestamp: {error}"),
        )
    })
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}
