//! gaze-analyzer library
//!
//! This library turns a collected batch of timestamped eye-gaze samples into
//! fixations and saccades. It includes:
//!
//! - `gaze_sample`: Gaze sample type, timestamp normalization and JSON decoding
//! - `fixation`: Dispersion-threshold (I-DT) fixation detection
//! - `saccade`: Saccades between consecutive fixations and their aggregate statistics
//! - `report`: Full-pipeline report with CSV and text summary export
//! - `heatmap`: Smoothed gaze density grid
//! - `plot`: PNG plots of the fixation sequence, saccade distances and gaze heatmap
//! - `config`: Detection thresholds
//!
//! # Example
//!
//! ```rust,ignore
//! use gaze_analyzer::config::DetectionConfig;
//! use gaze_analyzer::gaze_sample::parser;
//! use gaze_analyzer::report::GazeReport;
//!
//! let samples = parser::parse_json(&std::fs::read_to_string("gazeData.json")?)?;
//! let report = GazeReport::assemble(&samples, &DetectionConfig::default())?;
//!
//! if let Some(stats) = report.stats.measured() {
//!     println!("mean saccade distance: {:.2}px", stats.mean_distance);
//! }
//! report.export(std::path::Path::new("out"))?;
//! ```

pub mod config;
pub mod error;
pub mod fixation;
pub mod gaze_sample;
pub mod heatmap;
pub mod plot;
pub mod report;
pub mod saccade;

pub use error::{GazeError, Result};
