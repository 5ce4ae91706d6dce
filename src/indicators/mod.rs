//! Indicator engine: closing prices -> MACD, RSI and Bollinger Bands.
//!
//! `enrich` runs every indicator over the full closing series in one forward
//! pass, then keeps only the rows where all of them have enough trailing
//! history. Input shorter than `IndicatorParams::largest_window` is rejected
//! up front rather than producing an empty or partially undefined table.

pub mod bollinger;
pub mod macd;
pub mod rsi;

pub use bollinger::{Band, bollinger};
pub use macd::{MacdLines, macd};
pub use rsi::{rsi, rsi_from_averages};

use crate::domain::{EnrichedRow, EnrichedSeries, IndicatorParams, IndicatorRow, Series};
use crate::error::AppError;

/// Compute indicators for `series` and drop the warm-up rows.
///
/// The output has `series.len() - (params.largest_window() - 1)` rows.
pub fn enrich(series: &Series, params: &IndicatorParams) -> Result<EnrichedSeries, AppError> {
    params.validate()?;

    let required = params.largest_window();
    if series.len() < required {
        return Err(AppError::insufficient_history(required, series.len()));
    }

    let closes = series.closes();
    let lines = macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
    let rsi_values = rsi(&closes, params.rsi_window);
    let bands = bollinger(&closes, params.bollinger_window, params.bollinger_k);

    let start = required - 1;
    let mut rows = Vec::with_capacity(series.len() - start);
    for (i, point) in series.points().iter().enumerate().skip(start) {
        let rsi = rsi_values[i]
            .ok_or_else(|| AppError::model(format!("RSI undefined on {} after warm-up.", point.date)))?;
        let band = bands[i].ok_or_else(|| {
            AppError::model(format!("Bollinger bands undefined on {} after warm-up.", point.date))
        })?;

        rows.push(EnrichedRow {
            point: *point,
            indicators: IndicatorRow {
                macd: lines.macd[i],
                signal: lines.signal[i],
                histogram: lines.histogram[i],
                rsi,
                bb_middle: band.middle,
                bb_upper: band.upper,
                bb_lower: band.lower,
                bb_std: band.std,
            },
        });
    }

    tracing::debug!(
        symbol = series.symbol(),
        raw = series.len(),
        enriched = rows.len(),
        warmup = start,
        "computed indicators"
    );

    Ok(EnrichedSeries {
        symbol: series.symbol().to_string(),
        params: *params,
        rows,
    })
}
