//! Next-step close regressors.
//!
//! Both models implement `Regressor`, so the trainer can fit and score them
//! through one code path:
//!
//! - `LinearRegression`: OLS with intercept (SVD solve)
//! - `RandomForest`: bagged regression trees

pub mod forest;
pub mod linear;
pub mod tree;

pub use forest::RandomForest;
pub use linear::LinearRegression;

use crate::error::AppError;

/// A supervised regressor over a row-major feature matrix.
pub trait Regressor: Send + Sync {
    /// Human-readable label for reports and chart legends.
    fn name(&self) -> &'static str;

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), AppError>;

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AppError>;
}

/// Validate a training matrix and return its width.
pub(crate) fn check_fit_input(x: &[Vec<f64>], y: &[f64]) -> Result<usize, AppError> {
    if x.is_empty() {
        return Err(AppError::model("No training rows."));
    }
    if x.len() != y.len() {
        return Err(AppError::model(format!(
            "Feature rows ({}) and targets ({}) differ in length.",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if width == 0 {
        return Err(AppError::model("Training rows have no features."));
    }
    if x.iter().any(|r| r.len() != width) {
        return Err(AppError::model("Training rows have inconsistent widths."));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(AppError::model("Training data contains non-finite values."));
    }
    Ok(width)
}

pub(crate) fn check_predict_input(x: &[Vec<f64>], width: usize) -> Result<(), AppError> {
    if let Some(row) = x.iter().find(|r| r.len() != width) {
        return Err(AppError::model(format!(
            "Expected {width} features per row, got {}.",
            row.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_input_validation() {
        assert!(check_fit_input(&[], &[]).is_err());
        assert!(check_fit_input(&[vec![1.0]], &[1.0, 2.0]).is_err());
        assert!(check_fit_input(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]).is_err());
        assert!(check_fit_input(&[vec![f64::NAN]], &[1.0]).is_err());
        assert_eq!(check_fit_input(&[vec![1.0, 2.0]], &[1.0]).unwrap(), 2);
    }

    #[test]
    fn models_share_the_trait() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..30).map(|i| 2.0 * i as f64).collect();
        let mut models: Vec<Box<dyn Regressor>> = vec![
            Box::new(LinearRegression::new()),
            Box::new(RandomForest::new(crate::domain::ForestConfig {
                n_trees: 5,
                ..Default::default()
            })),
        ];
        for m in &mut models {
            m.fit(&x, &y).unwrap();
            assert_eq!(m.predict(&x).unwrap().len(), 30);
        }
    }
}
