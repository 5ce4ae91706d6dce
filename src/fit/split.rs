//! Chronological train/test split.
//!
//! No shuffling: the test partition is the most recent `ceil(n · fraction)`
//! rows, everything before it is training data.

use crate::error::AppError;
use crate::fit::FeatureTable;

#[derive(Debug, Clone)]
pub struct Split {
    pub train: FeatureTable,
    pub test: FeatureTable,
}

pub fn chronological_split(table: &FeatureTable, test_fraction: f64) -> Result<Split, AppError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AppError::invalid_input(format!(
            "Test fraction must be in (0, 1), got {test_fraction}."
        )));
    }

    let n = table.len();
    let test_len = (n as f64 * test_fraction).ceil() as usize;
    let train_len = n.saturating_sub(test_len);
    if train_len == 0 || test_len == 0 {
        // Two rows is the smallest table that yields both partitions.
        return Err(AppError::insufficient_history(2, n));
    }

    Ok(Split {
        train: table.slice(0, train_len),
        test: table.slice(train_len, n),
    })
}
