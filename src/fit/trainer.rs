//! Fit both regressors on the training partition and score them on the test
//! partition.

use std::time::Instant;

use tracing::{debug, info};

use crate::domain::ForestConfig;
use crate::error::AppError;
use crate::fit::Split;
use crate::models::{LinearRegression, RandomForest, Regressor};
use crate::report::Metrics;

/// Test-partition predictions and scores for one model.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub name: &'static str,
    pub predictions: Vec<f64>,
    pub metrics: Metrics,
}

#[derive(Debug, Clone)]
pub struct TrainingOutput {
    pub linear: ModelRun,
    pub forest: ModelRun,
    /// `(feature, importance)` sorted by importance, descending.
    pub importances: Vec<(&'static str, f64)>,
}

impl TrainingOutput {
    pub fn runs(&self) -> [&ModelRun; 2] {
        [&self.linear, &self.forest]
    }
}

pub fn train_and_evaluate(split: &Split, forest: &ForestConfig) -> Result<TrainingOutput, AppError> {
    let mut linear_model = LinearRegression::new();
    let linear = fit_and_score(&mut linear_model, split)?;

    let mut forest_model = RandomForest::new(*forest);
    let forest_run = fit_and_score(&mut forest_model, split)?;

    let mut importances: Vec<(&'static str, f64)> = split
        .train
        .feature_names
        .iter()
        .copied()
        .zip(forest_model.feature_importances().iter().copied())
        .collect();
    importances.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(TrainingOutput {
        linear,
        forest: forest_run,
        importances,
    })
}

fn fit_and_score<M: Regressor>(model: &mut M, split: &Split) -> Result<ModelRun, AppError> {
    let started = Instant::now();
    model.fit(&split.train.rows, &split.train.targets)?;
    debug!(
        model = model.name(),
        train_rows = split.train.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "model fitted"
    );

    let predictions = model.predict(&split.test.rows)?;
    if predictions.iter().any(|p| !p.is_finite()) {
        return Err(AppError::model(format!("{} produced non-finite predictions.", model.name())));
    }
    let metrics = Metrics::compute(&split.test.targets, &predictions)?;
    info!(
        model = model.name(),
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2,
        "model evaluated"
    );

    Ok(ModelRun {
        name: model.name(),
        predictions,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::fit::{FeatureTable, chronological_split};

    fn linear_table(n: usize) -> FeatureTable {
        let day0 = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        FeatureTable {
            feature_names: vec!["a", "b"],
            rows: (0..n).map(|i| vec![i as f64, ((i * 5) % 7) as f64]).collect(),
            targets: (0..n).map(|i| 10.0 + 0.5 * i as f64 + ((i * 5) % 7) as f64).collect(),
            dates: (0..n).map(|i| day0 + chrono::Days::new(i as u64)).collect(),
        }
    }

    #[test]
    fn scores_both_models_on_test_rows() {
        let table = linear_table(60);
        let split = chronological_split(&table, 0.25).unwrap();
        let out = train_and_evaluate(
            &split,
            &ForestConfig {
                n_trees: 10,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(out.linear.predictions.len(), split.test.len());
        assert_eq!(out.forest.predictions.len(), split.test.len());
        assert_eq!(out.linear.name, "Linear Regression");
        assert_eq!(out.forest.name, "Random Forest");

        // Exact linear target: OLS extrapolates, trees cannot.
        assert!(out.linear.metrics.rmse < 1e-6);
        assert!(out.forest.metrics.rmse > out.linear.metrics.rmse);

        assert_eq!(out.importances.len(), 2);
        assert!(out.importances[0].1 >= out.importances[1].1);
    }
}
