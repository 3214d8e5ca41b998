//! Error types for gaze event detection and report export.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GazeError {
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Samples are not sorted by timestamp: sample {index} is earlier than its predecessor")]
    UnsortedSamples { index: usize },

    #[error("Invalid gaze sample at index {index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Font unavailable: {0}")]
    FontUnavailable(String),
}

pub type Result<T> = std::result::Result<T, GazeError>;
