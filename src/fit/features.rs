//! Supervised table built from an enriched series.
//!
//! Row `t` holds the OHLCV bar and indicator values of day `t`; its target is
//! the close of day `t + 1`. The last enriched row has no successor and is
//! dropped, so the table is one row shorter than the series.

use chrono::NaiveDate;

use crate::domain::EnrichedSeries;
use crate::error::AppError;

pub const FEATURE_NAMES: [&str; 11] = [
    "open", "high", "low", "close", "volume", "macd", "signal", "rsi", "bb_middle", "bb_upper",
    "bb_lower",
];

#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub feature_names: Vec<&'static str>,
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    /// Date of the target close (the day being predicted).
    pub dates: Vec<NaiveDate>,
}

impl FeatureTable {
    pub fn from_enriched(series: &EnrichedSeries) -> Result<Self, AppError> {
        if series.len() < 2 {
            return Err(AppError::insufficient_history(
                series.params.largest_window().saturating_add(1),
                series.len(),
            ));
        }

        let mut table = FeatureTable {
            feature_names: FEATURE_NAMES.to_vec(),
            ..Default::default()
        };
        for pair in series.rows.windows(2) {
            let (today, next) = (&pair[0], &pair[1]);
            let p = today.point;
            let ind = today.indicators;
            table.rows.push(vec![
                p.open,
                p.high,
                p.low,
                p.close,
                p.volume,
                ind.macd,
                ind.signal,
                ind.rsi,
                ind.bb_middle,
                ind.bb_upper,
                ind.bb_lower,
            ]);
            table.targets.push(next.point.close);
            table.dates.push(next.point.date);
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Contiguous sub-table `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> FeatureTable {
        FeatureTable {
            feature_names: self.feature_names.clone(),
            rows: self.rows[start..end].to_vec(),
            targets: self.targets[start..end].to_vec(),
            dates: self.dates[start..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_series;
    use crate::domain::IndicatorParams;
    use crate::indicators::enrich;

    fn enriched() -> EnrichedSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let series = generate_series("TEST", start, end, 7).unwrap();
        enrich(&series, &IndicatorParams::default()).unwrap()
    }

    #[test]
    fn target_is_next_close() {
        let e = enriched();
        let table = FeatureTable::from_enriched(&e).unwrap();

        assert_eq!(table.len(), e.len() - 1);
        assert_eq!(table.n_features(), 11);
        for t in 0..table.len() {
            assert_eq!(table.rows[t][3], e.rows[t].point.close);
            assert_eq!(table.targets[t], e.rows[t + 1].point.close);
            assert_eq!(table.dates[t], e.rows[t + 1].point.date);
        }
    }

    #[test]
    fn single_row_is_insufficient() {
        let mut e = enriched();
        e.rows.truncate(1);
        let err = FeatureTable::from_enriched(&e).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InsufficientHistory);
    }
}
