//! Saccade analysis module
//!
//! Derives one saccade per adjacent pair of fixations and summarizes them as
//! mean distance, mean velocity and density (saccades per second of
//! observation).
//!
//! Saccades whose duration is zero or negative (back-to-back or overlapping
//! fixations) have no defined velocity. They are kept in the saccade list and
//! in the distance mean, left out of the velocity mean, and counted in
//! `AggregateStats::degenerate_saccades`.

use log::{info, warn};
use serde::Serialize;

use crate::fixation::Fixation;
use crate::gaze_sample::ObservationSpan;

/// Movement between two consecutive fixations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Saccade {
    pub from_x: f64,
    pub from_y: f64,
    pub to_x: f64,
    pub to_y: f64,
    /// Euclidean distance between the fixation centroids (pixels)
    pub distance: f64,
    /// Time from the end of the previous fixation to the start of the next (seconds)
    pub duration_sec: f64,
}

impl Saccade {
    pub fn between(prev: &Fixation, next: &Fixation) -> Self {
        Self {
            from_x: prev.x,
            from_y: prev.y,
            to_x: next.x,
            to_y: next.y,
            distance: nalgebra::distance(&prev.centroid(), &next.centroid()),
            duration_sec: (next.start as i128 - prev.end as i128) as f64 / 1000.0,
        }
    }

    /// Velocity in pixels/sec, `None` when the duration is not positive
    pub fn velocity(&self) -> Option<f64> {
        (self.duration_sec > 0.0).then(|| self.distance / self.duration_sec)
    }
}

/// Summary statistics over a non-empty saccade sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Mean saccade distance (pixels)
    pub mean_distance: f64,
    /// Mean of per-saccade velocities (pixels/sec); `None` if no saccade has a positive duration
    pub mean_velocity: Option<f64>,
    /// Saccades per second of observation; `None` for a zero-length observation
    pub density: Option<f64>,
    /// Saccades left out of the velocity mean
    pub degenerate_saccades: usize,
}

/// Aggregate statistics, or the marker for too few fixations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SaccadeStats {
    /// Fewer than 2 fixations, so there is nothing to summarize
    InsufficientData,
    Measured(AggregateStats),
}

impl SaccadeStats {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, SaccadeStats::InsufficientData)
    }

    pub fn measured(&self) -> Option<&AggregateStats> {
        match self {
            SaccadeStats::Measured(stats) => Some(stats),
            SaccadeStats::InsufficientData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaccadeAnalysis {
    pub saccades: Vec<Saccade>,
    pub stats: SaccadeStats,
}

/// Build saccades from adjacent fixation pairs and summarize them
///
/// `observation` must span the original gaze sample sequence; density is
/// measured against it rather than against the fixations.
pub fn analyze(fixations: &[Fixation], observation: ObservationSpan) -> SaccadeAnalysis {
    let saccades: Vec<Saccade> = fixations.windows(2).map(|pair| Saccade::between(&pair[0], &pair[1])).collect();

    if saccades.is_empty() {
        info!("Not enough fixations ({}) to compute saccades", fixations.len());
        return SaccadeAnalysis {
            saccades,
            stats: SaccadeStats::InsufficientData,
        };
    }

    let count = saccades.len();
    let mean_distance = saccades.iter().map(|s| s.distance).sum::<f64>() / count as f64;

    let velocities: Vec<f64> = saccades.iter().filter_map(Saccade::velocity).collect();
    let degenerate_saccades = count - velocities.len();
    if degenerate_saccades > 0 {
        warn!("{} of {} saccades have a non-positive duration; excluded from mean velocity", degenerate_saccades, count);
    }
    let mean_velocity = if velocities.is_empty() {
        None
    } else {
        Some(velocities.iter().sum::<f64>() / velocities.len() as f64)
    };

    let observation_secs = observation.duration_secs();
    let density = if observation_secs > 0.0 {
        Some(count as f64 / observation_secs)
    } else {
        warn!("Observation span is {}ms; saccade density is undefined", observation.duration_ms());
        None
    };

    info!("Computed {} saccades, mean distance {:.2}px", count, mean_distance);

    SaccadeAnalysis {
        saccades,
        stats: SaccadeStats::Measured(AggregateStats {
            mean_distance,
            mean_velocity,
            density,
            degenerate_saccades,
        }),
    }
}

/// Equal-width buckets of saccade distances over `[0, max]`
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceHistogram {
    pub counts: Vec<usize>,
    pub bucket_size: f64,
}

pub fn distance_histogram(saccades: &[Saccade], bucket_count: usize) -> DistanceHistogram {
    let bucket_count = bucket_count.max(1);
    let mut counts = vec![0usize; bucket_count];

    let max_distance = saccades.iter().map(|s| s.distance).fold(0.0f64, f64::max);
    let bucket_size = if max_distance <= 0.0 { 1.0 } else { max_distance / bucket_count as f64 };

    for s in saccades {
        let idx = ((s.distance / bucket_size).floor() as usize).min(bucket_count - 1);
        counts[idx] += 1;
    }

    DistanceHistogram { counts, bucket_size }
}
