//! Least squares solver.
//!
//! The linear regressor solves
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! on a tall design matrix (one row per training day, one column per feature
//! plus the intercept).
//!
//! Implementation choices:
//! - We use SVD so the tall (non-square) system is solved robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Technical indicators are strongly collinear (MACD, bands and close all
//!   track the same price), so the solve retries with looser singular-value
//!   tolerances before giving up.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_handles_duplicate_columns() {
        // Two identical columns: minimum-norm solution splits the weight.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] + beta[1] - 2.0).abs() < 1e-8);
    }
}
