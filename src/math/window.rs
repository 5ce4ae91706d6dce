//! Moving-window primitives shared by the indicators.
//!
//! Output vectors always have the same length as the input. Positions without
//! enough trailing history hold `None` so callers can decide what a warm-up row
//! means for them.

/// Exponential moving average with `α = 2 / (span + 1)`.
///
/// Seeded with the first value (`EMA₀ = x₀`), then
/// `EMAₜ = α·xₜ + (1 − α)·EMAₜ₋₁`. Defined for every index.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Trailing simple moving average over `window` values.
///
/// Uses a running sum, so the cost is O(n) regardless of `window`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }
    let mut sum = 0.0;
    for (i, &x) in values.iter().enumerate() {
        sum += x;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

/// Trailing population standard deviation (divisor `window`).
///
/// Each window is recomputed from its own mean, O(n·w).
pub fn rolling_std_population(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for end in window..=values.len() {
        let slice = &values[end - window..end];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
        out[end - 1] = Some(var.max(0.0).sqrt());
    }
    out
}
