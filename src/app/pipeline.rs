//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! load -> enrich -> feature table -> chronological split -> train/evaluate
//!
//! The CLI and the TUI only differ in presentation (printing vs widgets).

use std::time::Instant;

use tracing::info;

use crate::domain::{EnrichedSeries, PipelineConfig, Series};
use crate::error::AppError;
use crate::fit::{FeatureTable, Split, TrainingOutput, chronological_split, train_and_evaluate};
use crate::indicators::enrich;

/// All computed outputs of a single `stx run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: Series,
    pub enriched: EnrichedSeries,
    pub table: FeatureTable,
    pub split: Split,
    pub training: TrainingOutput,
}

/// Load prices and derive indicators (no model training).
pub fn load_enriched(config: &PipelineConfig) -> Result<(Series, EnrichedSeries), AppError> {
    let series = load(config)?;
    let enriched = enrich(&series, &config.indicators)?;
    info!(rows = enriched.len(), "indicators computed");
    Ok((series, enriched))
}

/// Execute the full pipeline.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    let series = load(config)?;
    run_pipeline_with_series(config, series)
}

fn load(config: &PipelineConfig) -> Result<Series, AppError> {
    config.validate()?;
    let series = crate::data::load_series(config)?;
    info!(
        symbol = series.symbol(),
        source = config.source.display_name(),
        rows = series.len(),
        "prices loaded"
    );
    Ok(series)
}

/// Execute the pipeline on an already-loaded series.
pub fn run_pipeline_with_series(config: &PipelineConfig, series: Series) -> Result<RunOutput, AppError> {
    let started = Instant::now();

    let enriched = enrich(&series, &config.indicators)?;
    let table = FeatureTable::from_enriched(&enriched)?;
    let split = chronological_split(&table, config.test_fraction)?;
    info!(
        enriched = enriched.len(),
        train = split.train.len(),
        test = split.test.len(),
        "feature table split"
    );

    let training = train_and_evaluate(&split, &config.forest)?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "pipeline finished");

    Ok(RunOutput {
        series,
        enriched,
        table,
        split,
        training,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{DataSourceKind, FetchConfig, ForestConfig, IndicatorParams};
    use crate::error::ErrorKind;

    fn synthetic_config(start: NaiveDate, end: NaiveDate) -> PipelineConfig {
        PipelineConfig {
            symbol: "SYN".to_string(),
            start,
            end,
            source: DataSourceKind::Synthetic,
            csv_path: None,
            fetch: FetchConfig::default(),
            indicators: IndicatorParams::default(),
            test_fraction: 0.2,
            forest: ForestConfig {
                n_trees: 10,
                max_depth: 6,
                ..ForestConfig::default()
            },
            chart_dir: None,
            plot: false,
            plot_width: 100,
            plot_height: 25,
        }
    }

    #[test]
    fn synthetic_end_to_end() {
        let config = synthetic_config(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        );
        let out = run_pipeline(&config).unwrap();

        let largest = config.indicators.largest_window();
        assert_eq!(out.enriched.len(), out.series.len() - (largest - 1));
        assert_eq!(out.table.len(), out.enriched.len() - 1);
        assert_eq!(out.split.train.len() + out.split.test.len(), out.table.len());
        assert_eq!(
            out.split.test.len(),
            (out.table.len() as f64 * 0.2).ceil() as usize
        );

        for run in out.training.runs() {
            assert_eq!(run.predictions.len(), out.split.test.len());
            assert!(run.metrics.rmse.is_finite() && run.metrics.rmse >= 0.0);
        }
    }

    #[test]
    fn short_range_is_insufficient_history() {
        // Two weeks of weekdays is well under the 26-row warm-up.
        let config = synthetic_config(
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 16).unwrap(),
        );
        let err = run_pipeline(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientHistory);
    }

    #[test]
    fn load_enriched_skips_training() {
        let config = synthetic_config(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
        );
        let (series, enriched) = load_enriched(&config).unwrap();
        assert_eq!(enriched.len(), series.len() - 25);
    }
}
