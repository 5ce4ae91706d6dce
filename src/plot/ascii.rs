//! ASCII line plots for terminal output.
//!
//! Fixed-size character grid, deterministic output (golden-tested). The x axis
//! is the observation index; every series is stretched over the full width.
//!
//! Draw order matters: earlier series win contested cells, and reference
//! lines (`.`) only fill cells no series touched.

use crate::fit::{FeatureTable, TrainingOutput};

/// One line on an ASCII plot.
#[derive(Debug, Clone, Copy)]
pub struct AsciiSeries<'a> {
    pub label: &'a str,
    pub glyph: char,
    pub values: &'a [f64],
}

/// Render series plus optional horizontal reference lines.
///
/// `x_labels` are printed under the left and right edges of the grid.
pub fn render_ascii_plot(
    title: &str,
    series: &[AsciiSeries<'_>],
    reference_lines: &[f64],
    x_labels: (&str, &str),
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(series, reference_lines).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for s in series {
        draw_series(&mut grid, s, y_min, y_max);
    }
    for &level in reference_lines {
        let row = map_y(level, y_min, y_max, height);
        for cell in grid[row].iter_mut().filter(|c| **c == ' ') {
            *cell = '.';
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{title} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let (left, right) = x_labels;
    let used = left.chars().count() + right.chars().count();
    let gap = width.saturating_sub(used).max(1);
    out.push_str(&format!("{left}{}{right}\n", " ".repeat(gap)));

    let legend: Vec<String> = series.iter().map(|s| format!("{} {}", s.glyph, s.label)).collect();
    out.push_str(&legend.join("  "));
    out.push('\n');
    out
}

/// Actual vs predicted closes over the test partition.
pub fn render_prediction_plot(
    test: &FeatureTable,
    training: &TrainingOutput,
    width: usize,
    height: usize,
) -> String {
    let first = test.dates.first().map(|d| d.to_string()).unwrap_or_default();
    let last = test.dates.last().map(|d| d.to_string()).unwrap_or_default();
    let series = [
        AsciiSeries {
            label: "actual",
            glyph: '*',
            values: &test.targets,
        },
        AsciiSeries {
            label: training.linear.name,
            glyph: 'l',
            values: &training.linear.predictions,
        },
        AsciiSeries {
            label: training.forest.name,
            glyph: 'f',
            values: &training.forest.predictions,
        },
    ];
    render_ascii_plot(
        "Next-day close (test)",
        &series,
        &[],
        (first.as_str(), last.as_str()),
        width,
        height,
    )
}

fn y_range(series: &[AsciiSeries<'_>], reference_lines: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let values = series
        .iter()
        .flat_map(|s| s.values.iter())
        .chain(reference_lines)
        .filter(|v| v.is_finite());
    for &v in values {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top (largest y).
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], series: &AsciiSeries<'_>, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();
    let n = series.values.len();

    let mut prev = None;
    for (i, &v) in series.values.iter().enumerate() {
        if !v.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(i, n, width);
        let y = map_y(v, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, series.glyph),
            None if grid[y][x] == ' ' => grid[y][x] = series.glyph,
            None => {}
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham). Only blank cells are written.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
