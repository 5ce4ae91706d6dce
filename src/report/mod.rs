//! Evaluation metrics and formatted terminal output.

pub mod format;

pub use format::*;

use crate::error::AppError;

/// Out-of-sample error summary for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl Metrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self, AppError> {
        Ok(Self {
            rmse: rmse(actual, predicted)?,
            mae: mae(actual, predicted)?,
            r2: r2(actual, predicted)?,
        })
    }
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<(), AppError> {
    if actual.is_empty() {
        return Err(AppError::model("Cannot score an empty prediction set."));
    }
    if actual.len() != predicted.len() {
        return Err(AppError::model(format!(
            "Actual ({}) and predicted ({}) lengths differ.",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    check_pair(actual, predicted)?;
    let sse: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Ok((sse / actual.len() as f64).sqrt())
}

pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    check_pair(actual, predicted)?;
    let sae: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Ok(sae / actual.len() as f64)
}

/// Coefficient of determination. A constant `actual` (SStot = 0) scores 0.
pub fn r2(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    check_pair(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return Ok(0.0);
    }
    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        let m = Metrics::compute(&y, &y).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn known_values() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [2.0, 2.0, 3.0, 2.0];
        // errors: -1, 0, 0, 2
        assert!((rmse(&actual, &predicted).unwrap() - (5.0f64 / 4.0).sqrt()).abs() < 1e-12);
        assert!((mae(&actual, &predicted).unwrap() - 0.75).abs() < 1e-12);
        // SStot = 5, SSres = 5
        assert!(r2(&actual, &predicted).unwrap().abs() < 1e-12);
    }

    #[test]
    fn constant_actual_scores_zero_r2() {
        assert_eq!(r2(&[5.0, 5.0], &[4.0, 6.0]).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_or_empty_inputs_error() {
        assert!(rmse(&[], &[]).is_err());
        assert!(mae(&[1.0], &[1.0, 2.0]).is_err());
    }
}
