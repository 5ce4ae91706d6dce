//! Shared domain types.
//!
//! Raw market data is immutable once loaded: a `Series` is validated on
//! construction (sorted, unique dates, finite positive closes) and every later
//! stage only reads from it.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One trading day of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A chronologically ordered daily price series for one symbol.
///
/// Invariants:
/// - dates are strictly increasing (no duplicates; gaps are allowed)
/// - every field is finite and `close > 0`
#[derive(Debug, Clone)]
pub struct Series {
    symbol: String,
    points: Vec<PricePoint>,
}

impl Series {
    /// Build a series, sorting by date and rejecting duplicates or bad values.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self, AppError> {
        let symbol = symbol.into();
        points.sort_by_key(|p| p.date);

        for w in points.windows(2) {
            if w[0].date == w[1].date {
                return Err(AppError::invalid_input(format!(
                    "Duplicate date {} in series {symbol}.",
                    w[0].date
                )));
            }
        }

        for p in &points {
            let finite = [p.open, p.high, p.low, p.close, p.volume]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                return Err(AppError::invalid_input(format!(
                    "Non-finite value on {} in series {symbol}.",
                    p.date
                )));
            }
            if p.close <= 0.0 {
                return Err(AppError::invalid_input(format!(
                    "Non-positive close on {} in series {symbol}.",
                    p.date
                )));
            }
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}

/// Window sizes for the indicator engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParams {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_window: usize,
    pub bollinger_window: usize,
    /// Band half-width in standard deviations.
    pub bollinger_k: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_window: 14,
            bollinger_window: 20,
            bollinger_k: 2.0,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.macd_fast == 0 || self.macd_slow == 0 || self.macd_signal == 0 {
            return Err(AppError::invalid_input("MACD spans must be >= 1."));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AppError::invalid_input(format!(
                "MACD fast span ({}) must be smaller than slow span ({}).",
                self.macd_fast, self.macd_slow
            )));
        }
        if self.rsi_window == 0 {
            return Err(AppError::invalid_input("RSI window must be >= 1."));
        }
        if self.bollinger_window == 0 {
            return Err(AppError::invalid_input("Bollinger window must be >= 1."));
        }
        if !(self.bollinger_k.is_finite() && self.bollinger_k > 0.0) {
            return Err(AppError::invalid_input("Bollinger band width (k) must be > 0."));
        }
        Ok(())
    }

    /// Number of prices needed before every indicator is defined.
    ///
    /// RSI averages `rsi_window` deltas, so it needs one extra price.
    /// Saturates at `usize::MAX`.
    pub fn largest_window(&self) -> usize {
        self.macd_slow
            .max(self.macd_signal)
            .max(self.rsi_window.saturating_add(1))
            .max(self.bollinger_window)
    }
}

/// Indicator values attached to a single trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub rsi: f64,
    pub bb_middle: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    /// Trailing population standard deviation behind the bands.
    pub bb_std: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichedRow {
    pub point: PricePoint,
    pub indicators: IndicatorRow,
}

/// Price series with indicators, warm-up rows removed.
#[derive(Debug, Clone)]
pub struct EnrichedSeries {
    pub symbol: String,
    pub params: IndicatorParams,
    pub rows: Vec<EnrichedRow>,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&EnrichedRow> {
        self.rows.last()
    }
}

/// Where the price series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// Yahoo Finance chart API.
    Yahoo,
    /// Local OHLCV CSV file.
    Csv,
    /// Seeded synthetic random walk (offline).
    Synthetic,
}

impl DataSourceKind {
    pub fn display_name(self) -> &'static str {
        match self {
            DataSourceKind::Yahoo => "yahoo",
            DataSourceKind::Csv => "csv",
            DataSourceKind::Synthetic => "synthetic",
        }
    }
}

/// Network settings for the market-data fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Extra attempts after the first failure.
    pub retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 2,
        }
    }
}

/// Random forest hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split (`None` = all).
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: DataSourceKind,
    pub csv_path: Option<PathBuf>,
    pub fetch: FetchConfig,

    pub indicators: IndicatorParams,
    pub test_fraction: f64,
    pub forest: ForestConfig,

    /// Directory for SVG charts (`None` disables chart files).
    pub chart_dir: Option<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.symbol.trim().is_empty() {
            return Err(AppError::invalid_input("Symbol must not be empty."));
        }
        if self.start >= self.end {
            return Err(AppError::invalid_input(format!(
                "Start date {} must be before end date {}.",
                self.start, self.end
            )));
        }
        if self.source == DataSourceKind::Csv && self.csv_path.is_none() {
            return Err(AppError::invalid_input("--source csv requires --csv <PATH>."));
        }
        if !(self.test_fraction.is_finite() && self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AppError::invalid_input(format!(
                "Test fraction must be in (0, 1), got {}.",
                self.test_fraction
            )));
        }
        if self.forest.n_trees == 0 {
            return Err(AppError::invalid_input("Random forest needs at least one tree."));
        }
        if self.forest.max_depth == 0 {
            return Err(AppError::invalid_input("Random forest max depth must be >= 1."));
        }
        self.indicators.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn series_sorts_by_date() {
        let s = Series::new("AAPL", vec![point(3, 3.0), point(1, 1.0), point(2, 2.0)]).unwrap();
        assert_eq!(s.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(s.symbol(), "AAPL");
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let err = Series::new("AAPL", vec![point(1, 1.0), point(1, 2.0)]).unwrap_err();
        assert!(err.to_string().contains("Duplicate date"));
    }

    #[test]
    fn series_rejects_non_positive_close() {
        assert!(Series::new("AAPL", vec![point(1, 0.0)]).is_err());
        assert!(Series::new("AAPL", vec![point(1, f64::NAN)]).is_err());
    }

    #[test]
    fn default_largest_window_is_slow_span() {
        assert_eq!(IndicatorParams::default().largest_window(), 26);
    }

    #[test]
    fn largest_window_saturates_on_huge_rsi_window() {
        let params = IndicatorParams {
            rsi_window: usize::MAX,
            ..IndicatorParams::default()
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.largest_window(), usize::MAX);
    }

    #[test]
    fn largest_window_counts_rsi_delta() {
        let params = IndicatorParams {
            macd_fast: 2,
            macd_slow: 3,
            macd_signal: 2,
            rsi_window: 14,
            bollinger_window: 5,
            bollinger_k: 2.0,
        };
        assert_eq!(params.largest_window(), 15);
    }

    #[test]
    fn params_validation() {
        let mut params = IndicatorParams::default();
        assert!(params.validate().is_ok());
        params.macd_fast = 26;
        assert!(params.validate().is_err());
        let params = IndicatorParams {
            bollinger_k: 0.0,
            ..IndicatorParams::default()
        };
        assert!(params.validate().is_err());
    }
}
