//! Moving Average Convergence Divergence.
//!
//! - `macd      = EMA(close, fast) - EMA(close, slow)`
//! - `signal    = EMA(macd, signal_span)`
//! - `histogram = macd - signal`
//!
//! All three lines use the seeded EMA recurrence, so they are defined from the
//! first price on. The engine still discards the first `slow - 1` rows so the
//! slow EMA has seen a full span of prices.

use crate::math::ema;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdLines {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema(&macd, signal_span);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdLines {
        macd,
        signal,
        histogram,
    }
}
