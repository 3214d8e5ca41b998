//! Gaze density heatmap grid
//!
//! Bins gaze samples into a `cols x rows` grid spanning the samples' bounding
//! box, then optionally blurs it with a separable Gaussian kernel. Row 0 is
//! the top of the screen (smallest y).

use crate::gaze_sample::GazeSample;

/// Grid configuration for heatmap generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapConfig {
    pub cols: usize,
    pub rows: usize,
    /// Gaussian blur standard deviation in cells. 0.0 disables smoothing.
    pub sigma: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            cols: 64,
            rows: 36,
            sigma: 1.5,
        }
    }
}

/// A gaze density grid in screen space
#[derive(Debug, Clone)]
pub struct HeatmapGrid {
    pub cols: usize,
    pub rows: usize,
    pub cells: Vec<f64>,
    pub max_density: f64,
    /// Screen-space x range covered by the grid
    pub x_range: (f64, f64),
    /// Screen-space y range covered by the grid
    pub y_range: (f64, f64),
}

/// Bounding interval of `values`, widened to unit length when degenerate
fn span(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max - min > 0.0 { (min, max) } else { (min - 0.5, min + 0.5) }
}

fn bin(value: f64, (min, max): (f64, f64), bins: usize) -> usize {
    let t = (value - min) / (max - min);
    ((t * bins as f64).floor() as usize).min(bins - 1)
}

fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f64> {
    let radius = ((3.0 * sigma).ceil() as usize).min(max_radius);
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let d = i as f64 - radius as f64;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= total);
    kernel
}

/// Separable convolution with zero padding at the borders
fn smooth(cells: &[f64], cols: usize, rows: usize, sigma: f64) -> Vec<f64> {
    let kernel = gaussian_kernel(sigma, cols.max(rows));
    let radius = (kernel.len() / 2) as isize;

    let convolve = |src: &[f64], along_rows: bool| -> Vec<f64> {
        let mut out = vec![0.0; src.len()];
        for row in 0..rows {
            for col in 0..cols {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let offset = k as isize - radius;
                    let (c, r) = if along_rows {
                        (col as isize + offset, row as isize)
                    } else {
                        (col as isize, row as isize + offset)
                    };
                    if c >= 0 && r >= 0 && (c as usize) < cols && (r as usize) < rows {
                        acc += w * src[r as usize * cols + c as usize];
                    }
                }
                out[row * cols + col] = acc;
            }
        }
        out
    };

    let horizontal = convolve(cells, true);
    convolve(&horizontal, false)
}

impl HeatmapGrid {
    pub fn from_samples(samples: &[GazeSample], config: HeatmapConfig) -> Self {
        let cols = config.cols.max(1);
        let rows = config.rows.max(1);
        let points: Vec<(f64, f64)> = samples
            .iter()
            .filter(|s| s.x.is_finite() && s.y.is_finite())
            .map(|s| (s.x, s.y))
            .collect();

        let x_range = span(points.iter().map(|p| p.0));
        let y_range = span(points.iter().map(|p| p.1));
        let mut cells = vec![0.0; cols * rows];

        for &(x, y) in &points {
            let idx = bin(y, y_range, rows) * cols + bin(x, x_range, cols);
            cells[idx] += 1.0;
        }

        if config.sigma.is_finite() && config.sigma > 0.0 && !points.is_empty() {
            cells = smooth(&cells, cols, rows, config.sigma);
        }

        let max_density = cells.iter().copied().fold(0.0_f64, f64::max);
        Self {
            cols,
            rows,
            cells,
            max_density,
            x_range,
            y_range,
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    pub fn normalized_cell(&self, col: usize, row: usize) -> Option<f64> {
        let value = self.cell(col, row)?;
        if self.max_density <= 0.0 {
            return Some(0.0);
        }
        Some(value / self.max_density)
    }

    /// Screen-space width and height of one cell
    pub fn cell_size(&self) -> (f64, f64) {
        (
            (self.x_range.1 - self.x_range.0) / self.cols as f64,
            (self.y_range.1 - self.y_range.0) / self.rows as f64,
        )
    }
}
