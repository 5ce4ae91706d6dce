//! Price series sources.
//!
//! - `yahoo`: remote daily bars (blocking HTTP, timeout + retries)
//! - `sample`: seeded synthetic series for offline runs
//! - CSV files are handled by `crate::io::ingest`

pub mod sample;
pub mod yahoo;

pub use sample::generate_series;
pub use yahoo::YahooClient;

use crate::domain::{DataSourceKind, PipelineConfig, Series};
use crate::error::AppError;

/// Load the raw series described by `config`.
pub fn load_series(config: &PipelineConfig) -> Result<Series, AppError> {
    match config.source {
        DataSourceKind::Yahoo => {
            let client = YahooClient::from_env(&config.fetch)?;
            client.fetch_series(&config.symbol, config.start, config.end)
        }
        DataSourceKind::Csv => {
            let path = config
                .csv_path
                .as_deref()
                .ok_or_else(|| AppError::invalid_input("--source csv requires --csv <PATH>."))?;
            let series = crate::io::load_csv_series(path, &config.symbol)?;
            restrict_to_range(series, config)
        }
        DataSourceKind::Synthetic => {
            generate_series(&config.symbol, config.start, config.end, config.forest.seed)
        }
    }
}

/// Keep CSV rows inside `[start, end)` so every source honours the date range.
fn restrict_to_range(series: Series, config: &PipelineConfig) -> Result<Series, AppError> {
    let points = series
        .points()
        .iter()
        .filter(|p| p.date >= config.start && p.date < config.end)
        .copied()
        .collect::<Vec<_>>();
    if points.is_empty() {
        return Err(AppError::invalid_input(format!(
            "CSV has no rows between {} and {}.",
            config.start, config.end
        )));
    }
    Series::new(series.symbol(), points)
}
