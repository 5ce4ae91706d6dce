//! Command-line parsing for the stock indicator pipeline.
//!
//! Argument parsing and command dispatch stay separate from the indicator and
//! modeling code; `crate::app` turns these structs into a `PipelineConfig`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::DataSourceKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "stx",
    version,
    about = "Technical indicators and next-day close models for daily stock prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: load, enrich, train, evaluate, chart.
    Run(PipelineArgs),
    /// Print the most recent enriched rows (no model training).
    Indicators(IndicatorsArgs),
    /// Launch the interactive TUI.
    ///
    /// Runs the same pipeline as `stx run` and renders the charts in the
    /// terminal with Ratatui.
    Tui(PipelineArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct PipelineArgs {
    /// Ticker symbol.
    #[arg(short = 's', long, default_value = "AAPL")]
    pub symbol: String,

    /// First day of the range (inclusive, YYYY-MM-DD).
    #[arg(long, default_value = "2020-01-01")]
    pub start: NaiveDate,

    /// Last day of the range (exclusive, YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub end: NaiveDate,

    /// Where prices come from.
    #[arg(long, value_enum, default_value_t = DataSourceKind::Yahoo)]
    pub source: DataSourceKind,

    /// OHLCV CSV file (required with `--source csv`).
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// MACD fast EMA span.
    #[arg(long, default_value_t = 12)]
    pub macd_fast: usize,

    /// MACD slow EMA span.
    #[arg(long, default_value_t = 26)]
    pub macd_slow: usize,

    /// MACD signal EMA span.
    #[arg(long, default_value_t = 9)]
    pub macd_signal: usize,

    /// RSI lookback (number of daily changes).
    #[arg(long, default_value_t = 14)]
    pub rsi_window: usize,

    /// Bollinger moving-average window.
    #[arg(long, default_value_t = 20)]
    pub bb_window: usize,

    /// Bollinger band width in standard deviations.
    #[arg(long, default_value_t = 2.0)]
    pub bb_k: f64,

    /// Fraction of rows (most recent) held out for testing.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Number of trees in the random forest.
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Maximum depth of each tree.
    #[arg(long, default_value_t = 12)]
    pub max_depth: usize,

    /// Random seed (forest bootstrap and synthetic prices).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Retries after a failed request.
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Directory for SVG charts.
    #[arg(long, default_value = "charts")]
    pub out_dir: PathBuf,

    /// Skip writing SVG charts.
    #[arg(long)]
    pub no_charts: bool,

    /// Render an ASCII plot of test predictions in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct IndicatorsArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Number of most recent rows to print.
    #[arg(long, default_value_t = 10)]
    pub tail: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::parse_from(["stx", "run"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.symbol, "AAPL");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(args.source, DataSourceKind::Yahoo);
        assert_eq!((args.macd_fast, args.macd_slow, args.macd_signal), (12, 26, 9));
        assert_eq!(args.rsi_window, 14);
        assert_eq!(args.bb_window, 20);
        assert_eq!(args.bb_k, 2.0);
        assert_eq!(args.test_fraction, 0.2);
        assert!(!args.no_charts);
        assert!(!args.plot);
    }

    #[test]
    fn indicators_tail_and_source() {
        let cli = Cli::parse_from([
            "stx",
            "indicators",
            "--tail",
            "3",
            "--source",
            "synthetic",
            "--symbol",
            "MSFT",
        ]);
        let Command::Indicators(args) = cli.command else {
            panic!("expected indicators");
        };
        assert_eq!(args.tail, 3);
        assert_eq!(args.pipeline.source, DataSourceKind::Synthetic);
        assert_eq!(args.pipeline.symbol, "MSFT");
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Cli::try_parse_from(["stx", "run", "--start", "2020-13-01"]).is_err());
    }
}
