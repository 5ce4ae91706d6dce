//! CSV ingest for local OHLCV files.
//!
//! Expected header (case-insensitive, any column order, extra columns ignored):
//!
//! ```text
//! date,open,high,low,close,volume
//! ```
//!
//! Design goals:
//! - **Strict schema** for required columns (clear error + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{PricePoint, Series};
use crate::error::AppError;

const REQUIRED: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Load a CSV file into a validated series.
pub fn load_csv_series(path: &Path, symbol: &str) -> Result<Series, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let (series, row_errors) = read_series(file, symbol)?;

    for err in row_errors.iter().take(5) {
        warn!(line = err.line, "skipped CSV row: {}", err.message);
    }
    info!(
        path = %path.display(),
        rows = series.len(),
        skipped = row_errors.len(),
        "loaded CSV prices"
    );
    Ok(series)
}

/// Parse OHLCV rows from any reader. Returns the series and skipped rows.
pub fn read_series<R: Read>(reader: R, symbol: &str) -> Result<(Series, Vec<RowError>), AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| AppError::invalid_input(format!("Failed to read CSV header: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("unreadable record: {e}"),
                });
                continue;
            }
        };
        match parse_row(&record, &columns) {
            Ok(p) => points.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if points.is_empty() {
        return Err(AppError::invalid_input("CSV contains no valid OHLCV rows."));
    }

    Ok((Series::new(symbol, points)?, row_errors))
}

/// Column index for each required field, in `REQUIRED` order.
fn resolve_columns(headers: &StringRecord) -> Result<[usize; 6], AppError> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
    let mut out = [0usize; 6];
    for (slot, name) in out.iter_mut().zip(REQUIRED) {
        *slot = normalized
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::invalid_input(format!("CSV is missing required column '{name}'.")))?;
    }
    Ok(out)
}

fn parse_row(record: &StringRecord, columns: &[usize; 6]) -> Result<PricePoint, String> {
    let get = |i: usize| record.get(columns[i]).unwrap_or("").trim();

    let raw_date = get(0);
    // Accept plain dates and timestamps with a trailing time part.
    let date_part = raw_date.get(..10).unwrap_or(raw_date);
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{raw_date}': {e}"))?;

    let mut values = [0.0f64; 5];
    for (k, slot) in values.iter_mut().enumerate() {
        let raw = get(k + 1);
        let v: f64 = raw
            .parse()
            .map_err(|_| format!("invalid {} '{raw}'", REQUIRED[k + 1]))?;
        if !v.is_finite() {
            return Err(format!("non-finite {}", REQUIRED[k + 1]));
        }
        *slot = v;
    }
    let [open, high, low, close, volume] = values;
    if close <= 0.0 {
        return Err(format!("non-positive close {close}"));
    }

    Ok(PricePoint {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}
