//! Gaze sample module with millisecond timestamps
//!
//! This module provides the GazeSample struct for raw screen-space gaze points
//! and the helpers that prepare a collected batch for event detection:
//! timestamp normalization and the observation span used for saccade density.

use serde::Serialize;

use crate::error::{GazeError, Result};

/// Largest accepted timestamp magnitude (2^53 ms, the exact-integer range of f64)
///
/// Any two timestamps within this bound differ by less than `i64::MAX`.
pub const MAX_TIMESTAMP_MS: i64 = 1 << 53;

/// A single raw gaze point in screen pixels with a millisecond timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GazeSample {
    pub x: f64,
    pub y: f64,
    pub timestamp: i64,
}

impl GazeSample {
    /// Create a new GazeSample
    pub fn new(x: f64, y: f64, timestamp: i64) -> Self {
        Self { x, y, timestamp }
    }

    /// Get the timestamp in seconds as a floating-point value
    pub fn time_secs(&self) -> f64 {
        self.timestamp as f64 / 1000.0
    }
}

/// Shift all timestamps so the first sample sits at t = 0
///
/// Callers are expected to pass samples already sorted by timestamp, so the
/// first sample is also the earliest one. Fails with `InvalidSample` if a
/// timestamp's offset from the first one does not fit in an `i64`.
pub fn normalize_timestamps(samples: &[GazeSample]) -> Result<Vec<GazeSample>> {
    let Some(origin) = samples.first().map(|s| s.timestamp) else {
        return Ok(Vec::new());
    };

    samples
        .iter()
        .enumerate()
        .map(|(index, s)| match s.timestamp.checked_sub(origin) {
            Some(offset) => Ok(GazeSample::new(s.x, s.y, offset)),
            None => Err(GazeError::InvalidSample {
                index,
                reason: format!("timestamp {} is too far from the first sample ({})", s.timestamp, origin),
            }),
        })
        .collect()
}

/// Time range covered by the original gaze sample sequence
///
/// Saccade density is measured against this span, not against the fixations,
/// so it has to be captured before detection discards any samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObservationSpan {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl ObservationSpan {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Span from the first to the last sample (zero-length for 0 or 1 samples)
    pub fn from_samples(samples: &[GazeSample]) -> Self {
        match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => Self::new(first.timestamp, last.timestamp),
            _ => Self::default(),
        }
    }

    /// Widened so any pair of `i64` endpoints is representable
    pub fn duration_ms(&self) -> i128 {
        self.end_ms as i128 - self.start_ms as i128
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }
}

/// Parser module for decoding uploaded gaze data
pub mod parser {
    use super::{GazeSample, MAX_TIMESTAMP_MS};
    use crate::error::{GazeError, Result};
    use serde::Deserialize;

    /// Wire shape of one uploaded point
    ///
    /// Browser trackers report fractional millisecond timestamps, so the
    /// timestamp is read as any JSON number and rounded afterwards.
    #[derive(Debug, Deserialize)]
    struct RawGazePoint {
        x: f64,
        y: f64,
        timestamp: f64,
    }

    fn to_sample(index: usize, raw: RawGazePoint) -> Result<GazeSample> {
        if !raw.x.is_finite() || !raw.y.is_finite() {
            return Err(GazeError::InvalidSample {
                index,
                reason: format!("non-finite coordinate ({}, {})", raw.x, raw.y),
            });
        }
        if !raw.timestamp.is_finite() {
            return Err(GazeError::InvalidSample {
                index,
                reason: format!("non-finite timestamp {}", raw.timestamp),
            });
        }

        let rounded = raw.timestamp.round();
        if rounded.abs() > MAX_TIMESTAMP_MS as f64 {
            return Err(GazeError::InvalidSample {
                index,
                reason: format!("timestamp {} out of range (|t| <= {} ms)", raw.timestamp, MAX_TIMESTAMP_MS),
            });
        }

        Ok(GazeSample::new(raw.x, raw.y, rounded as i64))
    }

    /// Parse a JSON array of `{x, y, timestamp}` objects
    pub fn parse_json(input: &str) -> Result<Vec<GazeSample>> {
        let raw: Vec<RawGazePoint> = serde_json::from_str(input)?;
        raw.into_iter()
            .enumerate()
            .map(|(index, point)| to_sample(index, point))
            .collect()
    }

    /// Parse gaze data from any reader (file, upload body, ...)
    pub fn parse_reader<R: std::io::Read>(reader: R) -> Result<Vec<GazeSample>> {
        let raw: Vec<RawGazePoint> = serde_json::from_reader(reader)?;
        raw.into_iter()
            .enumerate()
            .map(|(index, point)| to_sample(index, point))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GazeError;

    #[test]
    fn test_gaze_sample_new() {
        let sample = GazeSample::new(10.5, -20.0, 1234);
        assert_eq!(sample.x, 10.5);
        assert_eq!(sample.y, -20.0);
        assert_eq!(sample.timestamp, 1234);
    }

    #[test]
    fn test_time_secs() {
        let sample = GazeSample::new(0.0, 0.0, 1500);
        assert!((sample.time_secs() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_timestamps() {
        let samples = vec![
            GazeSample::new(1.0, 2.0, 1_700_000_000_100),
            GazeSample::new(3.0, 4.0, 1_700_000_000_150),
            GazeSample::new(5.0, 6.0, 1_700_000_000_400),
        ];

        let normalized = normalize_timestamps(&samples).unwrap();
        let times: Vec<i64> = normalized.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![0, 50, 300]);
        // Coordinates are untouched
        assert_eq!(normalized[2].x, 5.0);
        assert_eq!(normalized[2].y, 6.0);
    }

    #[test]
    fn test_normalize_timestamps_empty() {
        assert!(normalize_timestamps(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_timestamps_rejects_overflowing_offset() {
        let samples = vec![GazeSample::new(0.0, 0.0, i64::MIN + 10), GazeSample::new(1.0, 1.0, i64::MAX - 10)];

        let err = normalize_timestamps(&samples).unwrap_err();
        assert!(matches!(err, GazeError::InvalidSample { index: 1, .. }));
    }

    #[test]
    fn test_observation_span_extreme_endpoints() {
        let span = ObservationSpan::new(i64::MIN, i64::MAX);
        assert_eq!(span.duration_ms(), u64::MAX as i128);
        assert!(span.duration_secs() > 0.0);
    }

    #[test]
    fn test_observation_span() {
        let samples = vec![GazeSample::new(0.0, 0.0, 200), GazeSample::new(0.0, 0.0, 2700)];
        let span = ObservationSpan::from_samples(&samples);
        assert_eq!(span.duration_ms(), 2500);
        assert!((span.duration_secs() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_observation_span_single_and_empty() {
        let single = ObservationSpan::from_samples(&[GazeSample::new(1.0, 1.0, 42)]);
        assert_eq!(single.duration_ms(), 0);
        assert_eq!(ObservationSpan::from_samples(&[]), ObservationSpan::default());
    }

    #[test]
    fn test_parse_json() {
        let input = r#"[
            {"x": 100.5, "y": 200.0, "timestamp": 1000},
            {"x": 101.0, "y": 199.5, "timestamp": 1033.6}
        ]"#;

        let samples = parser::parse_json(input).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], GazeSample::new(100.5, 200.0, 1000));
        // Fractional timestamps round to the nearest millisecond
        assert_eq!(samples[1].timestamp, 1034);
    }

    #[test]
    fn test_parse_json_timestamp_out_of_range() {
        let input = r#"[
            {"x": 1.0, "y": 1.0, "timestamp": 1e30},
            {"x": 2.0, "y": 2.0, "timestamp": 2e30}
        ]"#;

        let err = parser::parse_json(input).unwrap_err();
        assert!(matches!(err, GazeError::InvalidSample { index: 0, .. }));

        let negative = r#"[{"x": 1.0, "y": 1.0, "timestamp": -1e17}]"#;
        assert!(matches!(parser::parse_json(negative), Err(GazeError::InvalidSample { index: 0, .. })));
    }

    #[test]
    fn test_parse_json_timestamp_at_bound() {
        let input = r#"[{"x": 1.0, "y": 1.0, "timestamp": 9007199254740992}]"#;
        let samples = parser::parse_json(input).unwrap();
        assert_eq!(samples[0].timestamp, MAX_TIMESTAMP_MS);
    }

    #[test]
    fn test_parse_json_empty_array() {
        assert!(parser::parse_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_json_missing_field() {
        let input = r#"[{"x": 1.0, "timestamp": 5}]"#;
        assert!(matches!(parser::parse_json(input), Err(GazeError::Json(_))));
    }

    #[test]
    fn test_parse_reader() {
        let input = br#"[{"x": 3, "y": 4, "timestamp": 7}]"#;
        let samples = parser::parse_reader(&input[..]).unwrap();
        assert_eq!(samples, vec![GazeSample::new(3.0, 4.0, 7)]);
    }
}
