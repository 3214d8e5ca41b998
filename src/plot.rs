//! Static PNG plots of detection results
//!
//! - `render_fixation_sequence`: fixation centroids in screen space, joined in
//!   visiting order and numbered from 1
//! - `render_distance_histogram`: saccade distances in equal-width buckets
//! - `render_heatmap`: smoothed gaze density in screen orientation (y down)
//!
//! Font loading failures surface as `GazeError::FontUnavailable`, every other
//! drawing failure as `GazeError::Render`.

use std::ops::Range;
use std::path::Path;

use log::info;
use plotters::prelude::*;
use plotters_backend::DrawingErrorKind;

use crate::error::{GazeError, Result};
use crate::fixation::Fixation;
use crate::gaze_sample::GazeSample;
use crate::heatmap::{HeatmapConfig, HeatmapGrid};
use crate::saccade::{Saccade, distance_histogram};

pub const PLOT_SIZE: (u32, u32) = (1000, 600);
pub const HISTOGRAM_BINS: usize = 10;
/// Normalized density below which heatmap cells are left blank
pub const HEATMAP_THRESHOLD: f64 = 0.05;

fn render_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> GazeError {
    match err {
        DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(e)) => GazeError::FontUnavailable(e.to_string()),
        other => GazeError::Render(other.to_string()),
    }
}

/// Jet-style ramp: dark blue, blue, cyan, yellow, red, dark red
fn heat_ramp() -> DerivedColorMap<RGBColor> {
    DerivedColorMap::new(&[
        RGBColor(0, 0, 128),
        RGBColor(0, 0, 255),
        RGBColor(0, 255, 255),
        RGBColor(255, 255, 0),
        RGBColor(255, 0, 0),
        RGBColor(128, 0, 0),
    ])
}

/// Axis ranges around all fixations with a margin of at least 10px
fn padded_bounds(fixations: &[Fixation]) -> (Range<f64>, Range<f64>) {
    if fixations.is_empty() {
        return (0.0..1.0, 0.0..1.0);
    }

    let x_min = fixations.iter().map(|f| f.x).fold(f64::INFINITY, f64::min);
    let x_max = fixations.iter().map(|f| f.x).fold(f64::NEG_INFINITY, f64::max);
    let y_min = fixations.iter().map(|f| f.y).fold(f64::INFINITY, f64::min);
    let y_max = fixations.iter().map(|f| f.y).fold(f64::NEG_INFINITY, f64::max);

    let pad_x = ((x_max - x_min) * 0.1).max(10.0);
    let pad_y = ((y_max - y_min) * 0.1).max(10.0);

    ((x_min - pad_x)..(x_max + pad_x), (y_min - pad_y)..(y_max + pad_y))
}

pub fn render_fixation_sequence(path: &Path, fixations: &[Fixation]) -> Result<()> {
    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (x_range, y_range) = padded_bounds(fixations);
    let mut chart = ChartBuilder::on(&root)
        .caption("Fixation Sequence with Lines", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    chart.configure_mesh().x_desc("x (px)").y_desc("y (px)").draw().map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(fixations.iter().map(|f| (f.x, f.y)), BLACK.stroke_width(1)))
        .map_err(render_err)?;

    chart
        .draw_series(fixations.iter().map(|f| Circle::new((f.x, f.y), 6, RED.filled())))
        .map_err(render_err)?
        .label("Fixations")
        .legend(|(x, y)| Circle::new((x, y), 4, RED.filled()));

    chart
        .draw_series(fixations.iter().enumerate().map(|(i, f)| {
            Text::new(format!("{}", i + 1), (f.x + 5.0, f.y - 5.0), ("sans-serif", 12).into_font().color(&BLUE))
        }))
        .map_err(render_err)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!("Wrote fixation plot to {}", path.display());
    Ok(())
}

pub fn render_distance_histogram(path: &Path, saccades: &[Saccade]) -> Result<()> {
    let hist = distance_histogram(saccades, HISTOGRAM_BINS);
    let max_count = hist.counts.iter().copied().max().unwrap_or(0) as u32 + 1;

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Histogram of Saccadic Distances", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(40)
        .build_cartesian_2d((0u32..HISTOGRAM_BINS as u32).into_segmented(), 0u32..max_count)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(format!("Distance bucket ({:.1} px each)", hist.bucket_size))
        .y_desc("Frequency")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.5).filled())
                .margin(2)
                .data(hist.counts.iter().enumerate().map(|(i, &c)| (i as u32, c as u32))),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!("Wrote saccade histogram to {}", path.display());
    Ok(())
}

/// Draw the gaze density grid of `samples`
///
/// The chart's y axis is flipped so the top of the image matches the top of
/// the screen; axis labels still read in screen pixels.
pub fn render_heatmap(path: &Path, samples: &[GazeSample], config: HeatmapConfig) -> Result<()> {
    let grid = HeatmapGrid::from_samples(samples, config);
    let (x_min, x_max) = grid.x_range;
    let (y_min, y_max) = grid.y_range;
    let (cell_w, cell_h) = grid.cell_size();
    let ramp = heat_ramp();

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    // Chart y is `y_max - y`, so screen row 0 is drawn at the top
    let mut chart = ChartBuilder::on(&root)
        .caption("Gaze Heatmap", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..(y_max - y_min))
        .map_err(render_err)?;

    let screen_y = |v: &f64| format!("{:.0}", y_max - v);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("x (px)")
        .y_desc("y (px)")
        .y_label_formatter(&screen_y)
        .draw()
        .map_err(render_err)?;

    let mut cells = Vec::new();
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let Some(level) = grid.normalized_cell(col, row) else {
                continue;
            };
            if level < HEATMAP_THRESHOLD {
                continue;
            }
            let x0 = x_min + col as f64 * cell_w;
            let top = (y_max - y_min) - row as f64 * cell_h;
            let color: RGBColor = ramp.get_color(level);
            cells.push(Rectangle::new([(x0, top), (x0 + cell_w, top - cell_h)], color.mix(0.85).filled()));
        }
    }
    info!("Heatmap: {} of {} cells above threshold", cells.len(), grid.cells.len());
    chart.draw_series(cells).map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!("Wrote gaze heatmap to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixation(x: f64, y: f64, start: i64) -> Fixation {
        Fixation {
            x,
            y,
            start,
            end: start + 100,
            first_index: 0,
            sample_count: 2,
        }
    }

    /// Only a missing font may skip the file check; any other failure fails the test
    fn check_rendered(result: Result<()>, path: &Path) {
        match result {
            Ok(()) => {
                let meta = std::fs::metadata(path).expect("plot file was not written");
                assert!(meta.len() > 0);
            }
            Err(GazeError::FontUnavailable(msg)) => println!("Skipping - no font available: {}", msg),
            Err(e) => panic!("unexpected render error: {}", e),
        }
    }

    #[test]
    fn test_padded_bounds() {
        let fixations = [fixation(100.0, 50.0, 0), fixation(300.0, 52.0, 200)];
        let (x, y) = padded_bounds(&fixations);

        assert!((x.start - 80.0).abs() < 1e-9);
        assert!((x.end - 320.0).abs() < 1e-9);
        // y spread is tiny, so the 10px minimum applies
        assert!((y.start - 40.0).abs() < 1e-9);
        assert!((y.end - 62.0).abs() < 1e-9);
    }

    #[test]
    fn test_padded_bounds_empty() {
        assert_eq!(padded_bounds(&[]), (0.0..1.0, 0.0..1.0));
    }

    #[test]
    fn test_render_fixation_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixations.png");
        let fixations = [fixation(100.0, 50.0, 0), fixation(300.0, 52.0, 200), fixation(250.0, 400.0, 400)];

        check_rendered(render_fixation_sequence(&path, &fixations), &path);
    }

    #[test]
    fn test_render_distance_histogram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("histogram.png");
        let fixations = [fixation(0.0, 0.0, 0), fixation(30.0, 40.0, 200), fixation(30.0, 140.0, 400)];
        let saccades: Vec<Saccade> = fixations.windows(2).map(|p| Saccade::between(&p[0], &p[1])).collect();

        check_rendered(render_distance_histogram(&path, &saccades), &path);
    }

    #[test]
    fn test_render_heatmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        let mut samples = Vec::new();
        for k in 0..40 {
            samples.push(GazeSample::new(200.0 + (k % 5) as f64, 150.0 + (k % 3) as f64, k * 20));
        }
        samples.push(GazeSample::new(900.0, 700.0, 900));

        check_rendered(render_heatmap(&path, &samples, HeatmapConfig::default()), &path);
    }

    #[test]
    fn test_render_heatmap_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty_heatmap.png");

        check_rendered(render_heatmap(&path, &[], HeatmapConfig::default()), &path);
    }

    #[test]
    fn test_heat_ramp_endpoints() {
        let ramp = heat_ramp();
        assert_eq!(ramp.get_color(0.0_f64), RGBColor(0, 0, 128));
        assert_eq!(ramp.get_color(1.0_f64), RGBColor(128, 0, 0));
    }

    #[test]
    fn test_render_err_separates_font_failures() {
        let font: DrawingAreaErrorKind<std::io::Error> =
            DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(Box::new(std::io::Error::other("no fonts"))));
        assert!(matches!(render_err(font), GazeError::FontUnavailable(_)));

        let drawing: DrawingAreaErrorKind<std::io::Error> =
            DrawingAreaErrorKind::BackendError(DrawingErrorKind::DrawingError(std::io::Error::other("disk full")));
        assert!(matches!(render_err(drawing), GazeError::Render(_)));
        assert!(matches!(render_err(DrawingAreaErrorKind::<std::io::Error>::LayoutError), GazeError::Render(_)));
    }
}
