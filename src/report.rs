//! Report assembly and export
//!
//! Runs the full pipeline over one batch (normalize, detect, analyze) and
//! writes the results as CSV rows and a plain-text summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::config::DetectionConfig;
use crate::error::Result;
use crate::fixation::{Fixation, detect_with_config};
use crate::gaze_sample::{GazeSample, ObservationSpan, normalize_timestamps};
use crate::saccade::{Saccade, SaccadeStats, analyze};

pub const FIXATIONS_CSV: &str = "fixations.csv";
pub const SACCADES_CSV: &str = "saccades.csv";
pub const SUMMARY_TXT: &str = "gaze_summary_report.txt";

/// Detector and analyzer output for one gaze batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GazeReport {
    pub total_samples: usize,
    pub config: DetectionConfig,
    pub fixations: Vec<Fixation>,
    pub saccades: Vec<Saccade>,
    pub stats: SaccadeStats,
}

/// Paths written by `GazeReport::export`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub fixations: PathBuf,
    pub saccades: Option<PathBuf>,
    pub summary: PathBuf,
}

impl GazeReport {
    /// Run detection and saccade analysis over a sorted sample batch
    pub fn assemble(samples: &[GazeSample], config: &DetectionConfig) -> Result<Self> {
        let samples = normalize_timestamps(samples)?;
        let fixations = detect_with_config(&samples, config)?;
        let analysis = analyze(&fixations, ObservationSpan::from_samples(&samples));

        Ok(Self {
            total_samples: samples.len(),
            config: *config,
            fixations,
            saccades: analysis.saccades,
            stats: analysis.stats,
        })
    }

    /// Header `x,y,start,end`, one row per fixation
    pub fn write_fixations_csv<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "x,y,start,end")?;
        for f in &self.fixations {
            writeln!(out, "{},{},{},{}", f.x, f.y, f.start, f.end)?;
        }
        Ok(())
    }

    /// Header `from_x,from_y,to_x,to_y,distance,duration_sec`, one row per saccade
    pub fn write_saccades_csv<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "from_x,from_y,to_x,to_y,distance,duration_sec")?;
        for s in &self.saccades {
            writeln!(out, "{},{},{},{},{},{}", s.from_x, s.from_y, s.to_x, s.to_y, s.distance, s.duration_sec)?;
        }
        Ok(())
    }

    /// Plain-text summary; the saccade file is only listed when it is written
    pub fn write_summary<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Eye Tracking Summary Report")?;
        writeln!(out, "===============================")?;
        writeln!(out)?;
        writeln!(out, "Total Gaze Points: {}", self.total_samples)?;
        writeln!(out, "Total Fixations: {}", self.fixations.len())?;

        match &self.stats {
            SaccadeStats::Measured(stats) => {
                writeln!(out, "Average Saccadic Distance: {:.2} pixels", stats.mean_distance)?;
                writeln!(out, "Average Saccadic Velocity: {} pixels/sec", format_optional(stats.mean_velocity))?;
                writeln!(out, "Average Saccadic Density: {} saccades/sec", format_optional(stats.density))?;
                if stats.degenerate_saccades > 0 {
                    writeln!(out, "Saccades without positive duration: {}", stats.degenerate_saccades)?;
                }
            }
            SaccadeStats::InsufficientData => {
                writeln!(out, "Not enough saccades for analysis.")?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Fixations exported to: {}", FIXATIONS_CSV)?;
        if !self.saccades.is_empty() {
            writeln!(out, "Saccades exported to: {}", SACCADES_CSV)?;
        }
        Ok(())
    }

    /// Write the CSV files and the summary into `dir`
    ///
    /// `saccades.csv` is skipped when there are no saccades.
    pub fn export(&self, dir: &Path) -> Result<ExportedFiles> {
        std::fs::create_dir_all(dir)?;

        let fixations = dir.join(FIXATIONS_CSV);
        let mut writer = BufWriter::new(File::create(&fixations)?);
        self.write_fixations_csv(&mut writer)?;
        writer.flush()?;

        let saccades = if self.saccades.is_empty() {
            None
        } else {
            let path = dir.join(SACCADES_CSV);
            let mut writer = BufWriter::new(File::create(&path)?);
            self.write_saccades_csv(&mut writer)?;
            writer.flush()?;
            Some(path)
        };

        let summary = dir.join(SUMMARY_TXT);
        let mut writer = BufWriter::new(File::create(&summary)?);
        self.write_summary(&mut writer)?;
        writer.flush()?;

        info!("Exported report to {}", dir.display());

        Ok(ExportedFiles { fixations, saccades, summary })
    }
}

fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "undefined".to_string(),
    }
}
