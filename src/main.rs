use anyhow::{Context, Result};
use clap::Parser;
use gaze_analyzer::config::DetectionConfig;
use gaze_analyzer::gaze_sample::parser;
use gaze_analyzer::heatmap::HeatmapConfig;
use gaze_analyzer::plot::{render_distance_histogram, render_fixation_sequence, render_heatmap};
use gaze_analyzer::report::GazeReport;
use gaze_analyzer::saccade::SaccadeStats;
use log::{debug, warn};
use std::{fs::File, io::BufReader, path::PathBuf};

/// Detect fixations and saccades in a recorded gaze batch
#[derive(Parser, Debug)]
#[command(name = "gaze-analyzer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gaze data file: JSON array of {x, y, timestamp}
    input: PathBuf,

    /// JSON config file with `radius` and/or `minDuration`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixation radius in pixels (overrides the config file)
    #[arg(short, long)]
    radius: Option<f64>,

    /// Minimum fixation duration in milliseconds (overrides the config file)
    #[arg(short = 'm', long)]
    min_duration: Option<i64>,

    /// Directory for CSV files, summary and plots
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Also render fixation, histogram and heatmap PNGs
    #[arg(long)]
    plots: bool,

    /// Print the full report as JSON to stdout instead of the text summary
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<DetectionConfig> {
    let mut config = match &cli.config {
        Some(path) => DetectionConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DetectionConfig::default(),
    };
    if let Some(radius) = cli.radius {
        config.radius = radius;
    }
    if let Some(min_duration) = cli.min_duration {
        config.min_duration_ms = min_duration;
    }
    config.validate()?;
    Ok(config)
}

fn print_summary(report: &GazeReport) {
    println!("Detected {} fixations from {} gaze points", report.fixations.len(), report.total_samples);
    for (i, f) in report.fixations.iter().enumerate() {
        println!("{:>4}  x={:<8.2} y={:<8.2} start={:<6} end={}", i + 1, f.x, f.y, f.start, f.end);
    }

    match &report.stats {
        SaccadeStats::Measured(stats) => {
            println!("\nAverage Saccadic Distance: {:.2} pixels", stats.mean_distance);
            match stats.mean_velocity {
                Some(v) => println!("Average Saccadic Velocity: {:.2} pixels/sec", v),
                None => println!("Average Saccadic Velocity: undefined (no saccade with positive duration)"),
            }
            match stats.density {
                Some(d) => println!("Average Saccadic Density: {:.2} saccades/sec", d),
                None => println!("Average Saccadic Density: undefined (zero-length observation)"),
            }
        }
        SaccadeStats::InsufficientData => println!("Not enough fixations to compute saccades."),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = load_config(&cli)?;
    debug!("Using radius={}px minDuration={}ms", config.radius, config.min_duration_ms);

    let file = File::open(&cli.input).with_context(|| format!("Failed to open {}", cli.input.display()))?;
    let samples = parser::parse_reader(BufReader::new(file)).with_context(|| format!("Failed to parse {}", cli.input.display()))?;

    if samples.is_empty() {
        println!("No gaze data found.");
        return Ok(());
    }

    let report = GazeReport::assemble(&samples, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    let exported = report.export(&cli.out_dir)?;
    if !cli.json {
        println!("\nFixations exported to: {}", exported.fixations.display());
        if let Some(saccades) = &exported.saccades {
            println!("Saccades exported to: {}", saccades.display());
        }
        println!("Summary written to: {}", exported.summary.display());
    }

    if cli.plots {
        render_fixation_sequence(&cli.out_dir.join("fixation_sequence.png"), &report.fixations)?;
        if report.saccades.is_empty() {
            warn!("No saccades; skipping distance histogram");
        } else {
            render_distance_histogram(&cli.out_dir.join("saccade_distances.png"), &report.saccades)?;
        }
        render_heatmap(&cli.out_dir.join("gaze_heatmap.png"), &samples, HeatmapConfig::default())?;
    }

    Ok(())
}
