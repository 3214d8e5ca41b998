//! Fixation detection module (dispersion-threshold identification, I-DT)
//!
//! This module segments an ordered gaze sample sequence into fixations: runs of
//! consecutive samples that stay inside a small spatial box for long enough.
//! It operates on a complete, already-collected batch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gaze_analyzer::fixation::detect;
//! use gaze_analyzer::gaze_sample::GazeSample;
//!
//! let samples: Vec<GazeSample> = /* sorted by timestamp */;
//! let fixations = detect(
//!     &samples,
//!     50.0,  // radius: max horizontal/vertical spread in pixels
//!     100,   // min_duration_ms: min first-to-last sample time
//! )?;
//! ```
//!
//! # How Detection Works
//!
//! 1. **Window Growth**: Starting at sample `i`, the window absorbs the next
//!    sample as long as both the horizontal and vertical spread (max - min)
//!    stay within `radius`. Growth never stops because of duration.
//!
//! 2. **Acceptance**: When the next sample would break the dispersion bound (or
//!    the input ends), the window is kept as a fixation only if it holds at
//!    least 2 samples and its first-to-last duration reaches `min_duration_ms`.
//!    Accepted windows resume the search right after their last sample.
//!
//! 3. **Rejection**: A rejected window is dropped as a whole and the search
//!    resumes at `i + 1`. A window is never shrunk and re-examined, so longer
//!    fixations win over shorter ones that would also qualify.
//!
//! The window keeps running extrema and coordinate sums, so each growth step
//! costs O(1) instead of rescanning the window. Sums are taken relative to the
//! window's first sample; every offset is bounded by `radius`, so the centroid
//! stays finite even for coordinates near `f64::MAX`.

use std::ops::Range;

use log::{debug, info};
use nalgebra::Point2;
use serde::Serialize;

use crate::config::DetectionConfig;
use crate::error::{GazeError, Result};
use crate::gaze_sample::GazeSample;

/// A detected fixation
///
/// `x`/`y` are the mean of the contributing samples, `start`/`end` the first
/// and last sample timestamps of the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fixation {
    pub x: f64,
    pub y: f64,
    pub start: i64,
    pub end: i64,
    /// Index of the first contributing sample in the input sequence
    #[serde(skip)]
    pub first_index: usize,
    /// Number of contributing samples (always >= 2)
    #[serde(skip)]
    pub sample_count: usize,
}

impl Fixation {
    pub fn centroid(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn duration_ms(&self) -> i128 {
        self.end as i128 - self.start as i128
    }

    /// Index range of the contributing samples (end exclusive)
    pub fn sample_range(&self) -> Range<usize> {
        self.first_index..self.first_index + self.sample_count
    }
}

/// Running spatial extent of a candidate window
///
/// `offset_x`/`offset_y` sum each sample's displacement from `origin`.
#[derive(Debug, Clone, Copy)]
struct WindowExtent {
    origin: (f64, f64),
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl WindowExtent {
    fn new(sample: &GazeSample) -> Self {
        Self {
            origin: (sample.x, sample.y),
            min_x: sample.x,
            max_x: sample.x,
            min_y: sample.y,
            max_y: sample.y,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    fn extended(&self, sample: &GazeSample) -> Self {
        Self {
            origin: self.origin,
            min_x: self.min_x.min(sample.x),
            max_x: self.max_x.max(sample.x),
            min_y: self.min_y.min(sample.y),
            max_y: self.max_y.max(sample.y),
            offset_x: self.offset_x + (sample.x - self.origin.0),
            offset_y: self.offset_y + (sample.y - self.origin.1),
        }
    }

    fn fits(&self, radius: f64) -> bool {
        self.max_x - self.min_x <= radius && self.max_y - self.min_y <= radius
    }

    fn centroid(&self, count: usize) -> (f64, f64) {
        let n = count as f64;
        (self.origin.0 + self.offset_x / n, self.origin.1 + self.offset_y / n)
    }
}

/// Check the detector's input preconditions
///
/// Samples must have finite coordinates and non-decreasing timestamps, and the
/// first-to-last time span must fit in an `i64`.
fn validate_samples(samples: &[GazeSample]) -> Result<()> {
    for (index, sample) in samples.iter().enumerate() {
        if !sample.x.is_finite() || !sample.y.is_finite() {
            return Err(GazeError::InvalidSample {
                index,
                reason: format!("non-finite coordinate ({}, {})", sample.x, sample.y),
            });
        }
    }

    if let Some(pos) = samples.windows(2).position(|w| w[1].timestamp < w[0].timestamp) {
        return Err(GazeError::UnsortedSamples { index: pos + 1 });
    }

    if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
        if last.timestamp.checked_sub(first.timestamp).is_none() {
            return Err(GazeError::InvalidSample {
                index: samples.len() - 1,
                reason: format!("time span {}ms..{}ms overflows", first.timestamp, last.timestamp),
            });
        }
    }

    Ok(())
}

/// Detect fixations with explicit thresholds
///
/// # Parameters
///
/// - `samples`: Gaze samples sorted ascending by timestamp
/// - `radius`: Maximum horizontal and vertical spread in pixels (>= 0)
/// - `min_duration_ms`: Minimum first-to-last sample duration (>= 0)
///
/// # Errors
///
/// - `InvalidParameter` for a negative or non-finite radius or a negative duration
/// - `UnsortedSamples` if any timestamp is earlier than its predecessor
/// - `InvalidSample` for non-finite coordinates or a time span that overflows `i64`
///
/// An empty input yields an empty fixation list.
pub fn detect(samples: &[GazeSample], radius: f64, min_duration_ms: i64) -> Result<Vec<Fixation>> {
    detect_with_config(samples, &DetectionConfig::new(radius, min_duration_ms))
}

/// Detect fixations using thresholds from a `DetectionConfig`
pub fn detect_with_config(samples: &[GazeSample], config: &DetectionConfig) -> Result<Vec<Fixation>> {
    config.validate()?;
    validate_samples(samples)?;

    let radius = config.radius;
    let n = samples.len();
    let mut fixations = Vec::new();
    let mut i = 0;

    while i < n {
        let mut extent = WindowExtent::new(&samples[i]);
        let mut j = i + 1;

        while j < n {
            let candidate = extent.extended(&samples[j]);
            if !candidate.fits(radius) {
                break;
            }
            extent = candidate;
            j += 1;
        }

        // Window is samples[i..j]
        let count = j - i;
        let start = samples[i].timestamp;
        let end = samples[j - 1].timestamp;

        if count > 1 && end - start >= config.min_duration_ms {
            let (x, y) = extent.centroid(count);
            let fixation = Fixation {
                x,
                y,
                start,
                end,
                first_index: i,
                sample_count: count,
            };
            debug!(
                "fixation #{} at ({:.1}, {:.1}) over samples {}..{} [{}ms..{}ms]",
                fixations.len() + 1,
                fixation.x,
                fixation.y,
                i,
                j,
                start,
                end
            );
            fixations.push(fixation);
            i = j;
        } else {
            i += 1;
        }
    }

    info!("Detected {} fixations from {} gaze samples", fixations.len(), n);

    Ok(fixations)
}
