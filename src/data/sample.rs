//! Synthetic daily price series for offline runs.
//!
//! Closes follow a geometric Brownian motion on weekdays between the start and
//! end dates. Open/high/low/volume are derived around each close so the bars
//! are internally consistent (`low <= open, close <= high`).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::{PricePoint, Series};
use crate::error::AppError;

const INITIAL_PRICE: f64 = 100.0;
/// Daily log-drift (roughly 10% a year).
const DAILY_DRIFT: f64 = 0.0004;
/// Daily log-volatility (roughly 24% a year).
const DAILY_VOL: f64 = 0.015;
/// Intraday range as a fraction of the close.
const RANGE_VOL: f64 = 0.006;
const MEDIAN_VOLUME: f64 = 5.0e7;

/// Generate a reproducible weekday series for `symbol` in `[start, end)`.
pub fn generate_series(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    seed: u64,
) -> Result<Series, AppError> {
    if start >= end {
        return Err(AppError::invalid_input("Synthetic range must have start < end."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(symbol, start, end, seed));
    let returns = Normal::new(DAILY_DRIFT, DAILY_VOL)
        .map_err(|e| AppError::model(format!("Return distribution error: {e}")))?;
    let gap = Normal::new(0.0, DAILY_VOL / 3.0)
        .map_err(|e| AppError::model(format!("Gap distribution error: {e}")))?;
    let volume = LogNormal::new(MEDIAN_VOLUME.ln(), 0.3)
        .map_err(|e| AppError::model(format!("Volume distribution error: {e}")))?;

    let mut points = Vec::new();
    let mut prev_close = INITIAL_PRICE;
    let mut date = start;
    while date < end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let open = prev_close * gap.sample(&mut rng).exp();
            let close = prev_close * returns.sample(&mut rng).exp();
            let wick_up: f64 = rng.r#gen::<f64>() * RANGE_VOL;
            let wick_down: f64 = rng.r#gen::<f64>() * RANGE_VOL;
            points.push(PricePoint {
                date,
                open,
                high: open.max(close) * (1.0 + wick_up),
                low: open.min(close) * (1.0 - wick_down),
                close,
                volume: volume.sample(&mut rng).round(),
            });
            prev_close = close;
        }
        date += Duration::days(1);
    }

    Series::new(symbol, points)
}

fn sample_seed(symbol: &str, start: NaiveDate, end: NaiveDate, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    symbol.hash(&mut hasher);
    start.hash(&mut hasher);
    end.hash(&mut hasher);
    seed.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekdays_only() {
        let s = generate_series("SYN", d(2024, 1, 1), d(2024, 2, 1), 7).unwrap();
        // January 2024 has 23 weekdays.
        assert_eq!(s.len(), 23);
        assert!(
            s.points()
                .iter()
                .all(|p| !matches!(p.date.weekday(), Weekday::Sat | Weekday::Sun))
        );
    }

    #[test]
    fn reproducible_for_same_seed() {
        let a = generate_series("SYN", d(2023, 1, 1), d(2023, 6, 1), 42).unwrap();
        let b = generate_series("SYN", d(2023, 1, 1), d(2023, 6, 1), 42).unwrap();
        assert_eq!(a.closes(), b.closes());

        let c = generate_series("SYN", d(2023, 1, 1), d(2023, 6, 1), 43).unwrap();
        assert_ne!(a.closes(), c.closes());
    }

    #[test]
    fn bars_are_consistent() {
        let s = generate_series("SYN", d(2022, 1, 1), d(2023, 1, 1), 1).unwrap();
        for p in s.points() {
            assert!(p.low <= p.open && p.open <= p.high);
            assert!(p.low <= p.close && p.close <= p.high);
            assert!(p.volume > 0.0);
        }
    }

    #[test]
    fn empty_range_rejected() {
        assert!(generate_series("SYN", d(2024, 1, 1), d(2024, 1, 1), 0).is_err());
    }
}
