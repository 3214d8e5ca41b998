//! Detection thresholds

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GazeError, Result};

/// Default fixation radius in pixels
pub const FIXATION_RADIUS: f64 = 50.0;
/// Default minimum fixation duration in milliseconds
pub const FIXATION_DURATION: i64 = 100;

/// Configuration for fixation detection with tunable thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum horizontal and vertical spread of a fixation window (pixels)
    pub radius: f64,

    /// Minimum first-to-last sample time of a fixation window (milliseconds)
    #[serde(rename = "minDuration")]
    pub min_duration_ms: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            radius: FIXATION_RADIUS,
            min_duration_ms: FIXATION_DURATION,
        }
    }
}

impl DetectionConfig {
    pub fn new(radius: f64, min_duration_ms: i64) -> Self {
        Self { radius, min_duration_ms }
    }

    /// Load a config from a JSON file such as `{"radius": 40, "minDuration": 80}`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Radius must be a finite, non-negative number; a zero radius only accepts
    /// coincident points. Minimum duration must be non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(GazeError::InvalidParameter {
                name: "radius",
                value: self.radius.to_string(),
            });
        }
        if self.min_duration_ms < 0 {
            return Err(GazeError::InvalidParameter {
                name: "minDuration",
                value: self.min_duration_ms.to_string(),
            });
        }
        Ok(())
    }
}
