//! Ordinary least squares linear regression with intercept.
//!
//! Features are z-scored with training-partition statistics before the solve.
//! Prices, volumes and oscillators live on very different scales (volume is
//! ~1e7, RSI is 0..100), and standardizing keeps the SVD tolerance meaningful.
//! Zero-variance columns keep scale 1 so they contribute nothing.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::solve_least_squares;
use crate::models::{Regressor, check_fit_input, check_predict_input};

#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    means: Vec<f64>,
    scales: Vec<f64>,
    /// Intercept first, then one weight per standardized feature.
    beta: Option<Vec<f64>>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intercept in original feature units.
    pub fn intercept(&self) -> Option<f64> {
        let beta = self.beta.as_ref()?;
        let shift: f64 = beta[1..]
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(b, (m, s))| b * m / s)
            .sum();
        Some(beta[0] - shift)
    }

    /// Coefficients in original feature units.
    pub fn coefficients(&self) -> Option<Vec<f64>> {
        let beta = self.beta.as_ref()?;
        Some(beta[1..].iter().zip(&self.scales).map(|(b, s)| b / s).collect())
    }

    fn standardize(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> &'static str {
        "Linear Regression"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), AppError> {
        let p = check_fit_input(x, y)?;
        let n = x.len();

        self.means = (0..p)
            .map(|j| x.iter().map(|r| r[j]).sum::<f64>() / n as f64)
            .collect();
        self.scales = (0..p)
            .map(|j| {
                let m = self.means[j];
                let var = x.iter().map(|r| (r[j] - m).powi(2)).sum::<f64>() / n as f64;
                let sd = var.sqrt();
                if sd.is_finite() && sd > 1e-12 { sd } else { 1.0 }
            })
            .collect();

        let mut design = DMatrix::<f64>::zeros(n, p + 1);
        for (i, row) in x.iter().enumerate() {
            design[(i, 0)] = 1.0;
            for (j, v) in self.standardize(row).into_iter().enumerate() {
                design[(i, j + 1)] = v;
            }
        }
        let target = DVector::from_column_slice(y);

        let beta = solve_least_squares(&design, &target)
            .ok_or_else(|| AppError::model("Linear regression system is too ill-conditioned to solve."))?;
        self.beta = Some(beta.iter().copied().collect());
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AppError> {
        let beta = self
            .beta
            .as_ref()
            .ok_or_else(|| AppError::model("Linear regression used before fit."))?;
        check_predict_input(x, self.means.len())?;

        Ok(x.iter()
            .map(|row| {
                beta[0]
                    + self
                        .standardize(row)
                        .iter()
                        .zip(&beta[1..])
                        .map(|(v, b)| v * b)
                        .sum::<f64>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_linear_relation() {
        // y = 3 + 2·a − 0.5·b
        let x: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![i as f64, ((i * 7) % 13) as f64 * 1000.0])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[1]).collect();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients().unwrap();
        assert!((model.intercept().unwrap() - 3.0).abs() < 1e-6);
        assert!((coef[0] - 2.0).abs() < 1e-7);
        assert!((coef[1] + 0.5).abs() < 1e-7);

        let pred = model.predict(&[vec![100.0, 2000.0]]).unwrap();
        assert!((pred[0] - (3.0 + 200.0 - 1000.0)).abs() < 1e-6);
    }

    #[test]
    fn constant_column_is_harmless() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 7.0]).collect();
        let y: Vec<f64> = (0..10).map(|i| 1.0 + i as f64).collect();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(&y) {
            assert!((p - t).abs() < 1e-8);
        }
    }

    #[test]
    fn predict_before_fit_errors() {
        assert!(LinearRegression::new().predict(&[vec![1.0]]).is_err());
    }

    #[test]
    fn width_mismatch_errors() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        assert!(model.predict(&[vec![1.0, 2.0]]).is_err());
    }
}
