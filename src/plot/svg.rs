//! SVG chart files.
//!
//! One file per view, written into the chart directory:
//!
//! - `macd.svg`: MACD, signal and histogram
//! - `rsi.svg`: RSI with 30/70 guides, fixed 0..100 axis
//! - `bollinger.svg`: close with the middle/upper/lower bands
//! - `predictions.svg`: actual vs predicted next-day close on the test rows
//!
//! The x axis is the row index; tick labels are mapped back to dates.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use plotters::prelude::*;
use tracing::debug;

use crate::domain::{EnrichedRow, EnrichedSeries};
use crate::error::AppError;
use crate::fit::{FeatureTable, TrainingOutput};

const SIZE: (u32, u32) = (1200, 600);

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

struct Line {
    label: String,
    color: RGBColor,
    values: Vec<f64>,
}

struct LineChart<'a> {
    title: String,
    y_desc: &'a str,
    dates: &'a [NaiveDate],
    lines: Vec<Line>,
    /// Fixed y range; derived from the data when `None`.
    y_bounds: Option<(f64, f64)>,
    guides: &'a [f64],
}

/// Write all four charts into `out_dir` and return their paths.
pub fn write_charts(
    out_dir: &Path,
    enriched: &EnrichedSeries,
    test: &FeatureTable,
    training: &TrainingOutput,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(out_dir).map_err(|e| {
        AppError::io(format!("Failed to create chart directory {}: {e}", out_dir.display()))
    })?;

    let dates: Vec<NaiveDate> = enriched.rows.iter().map(|r| r.point.date).collect();
    let ind = |f: fn(&EnrichedRow) -> f64| enriched.rows.iter().map(f).collect::<Vec<f64>>();
    let symbol = &enriched.symbol;

    let charts = [
        (
            "macd.svg",
            LineChart {
                title: format!("{symbol} MACD"),
                y_desc: "MACD",
                dates: &dates,
                lines: vec![
                    Line {
                        label: "MACD".into(),
                        color: BLUE,
                        values: ind(|r| r.indicators.macd),
                    },
                    Line {
                        label: "Signal".into(),
                        color: RGBColor(255, 140, 0),
                        values: ind(|r| r.indicators.signal),
                    },
                    Line {
                        label: "Histogram".into(),
                        color: RGBColor(128, 128, 128),
                        values: ind(|r| r.indicators.histogram),
                    },
                ],
                y_bounds: None,
                guides: &[0.0],
            },
        ),
        (
            "rsi.svg",
            LineChart {
                title: format!("{symbol} RSI"),
                y_desc: "RSI",
                dates: &dates,
                lines: vec![Line {
                    label: "RSI".into(),
                    color: RGBColor(128, 0, 128),
                    values: ind(|r| r.indicators.rsi),
                }],
                y_bounds: Some((0.0, 100.0)),
                guides: &[RSI_OVERSOLD, RSI_OVERBOUGHT],
            },
        ),
        (
            "bollinger.svg",
            LineChart {
                title: format!("{symbol} Bollinger Bands"),
                y_desc: "Price",
                dates: &dates,
                lines: vec![
                    Line {
                        label: "Close".into(),
                        color: BLACK,
                        values: ind(|r| r.point.close),
                    },
                    Line {
                        label: "Middle".into(),
                        color: BLUE,
                        values: ind(|r| r.indicators.bb_middle),
                    },
                    Line {
                        label: "Upper".into(),
                        color: RED,
                        values: ind(|r| r.indicators.bb_upper),
                    },
                    Line {
                        label: "Lower".into(),
                        color: GREEN,
                        values: ind(|r| r.indicators.bb_lower),
                    },
                ],
                y_bounds: None,
                guides: &[],
            },
        ),
        (
            "predictions.svg",
            LineChart {
                title: format!("{symbol} next-day close (test)"),
                y_desc: "Close",
                dates: &test.dates,
                lines: vec![
                    Line {
                        label: "Actual".into(),
                        color: BLACK,
                        values: test.targets.clone(),
                    },
                    Line {
                        label: training.linear.name.into(),
                        color: BLUE,
                        values: training.linear.predictions.clone(),
                    },
                    Line {
                        label: training.forest.name.into(),
                        color: RGBColor(0, 160, 0),
                        values: training.forest.predictions.clone(),
                    },
                ],
                y_bounds: None,
                guides: &[],
            },
        ),
    ];

    let mut written = Vec::with_capacity(charts.len());
    for (file, chart) in &charts {
        let path = out_dir.join(file);
        draw_line_chart(&path, chart)
            .map_err(|e| AppError::io(format!("Failed to write chart {}: {e}", path.display())))?;
        debug!(path = %path.display(), "chart written");
        written.push(path);
    }
    Ok(written)
}

fn draw_line_chart(path: &Path, spec: &LineChart<'_>) -> Result<(), Box<dyn Error>> {
    let n = spec.dates.len();
    if n == 0 {
        return Err("no rows to plot".into());
    }
    let x_max = n.saturating_sub(1).max(1) as f64;
    let (y0, y1) = match spec.y_bounds {
        Some(b) => b,
        None => padded_bounds(
            spec.lines
                .iter()
                .flat_map(|l| l.values.iter().copied())
                .chain(spec.guides.iter().copied()),
        ),
    };

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, y0..y1)?;

    let dates = spec.dates;
    chart
        .configure_mesh()
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&|v| date_label(dates, *v))
        .y_desc(spec.y_desc)
        .draw()?;

    for &level in spec.guides {
        chart.draw_series(LineSeries::new(
            [(0.0, level), (x_max, level)],
            RGBColor(170, 170, 170),
        ))?;
    }

    for line in &spec.lines {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(
                line.values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(i, &v)| (i as f64, v)),
                color,
            ))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-6);
    (lo - pad, hi + pad)
}

fn date_label(dates: &[NaiveDate], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 {
        return String::new();
    }
    dates
        .get(idx as usize)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
