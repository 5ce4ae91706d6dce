//! Relative Strength Index (simple-average variant).
//!
//! 1. `delta_t = close_t - close_{t-1}` for `t >= 1`
//! 2. split into gains (`max(delta, 0)`) and losses (`max(-delta, 0)`)
//! 3. average each over the trailing `window` deltas
//! 4. `RS = avg_gain / avg_loss`, `RSI = 100 - 100 / (1 + RS)`
//!
//! The first value lands at index `window`. When `avg_loss == 0` the RSI is
//! clamped to 100 (this includes a perfectly flat window), so the output never
//! contains NaN or infinity.

/// RSI for every index; `None` for the first `window` positions.
pub fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if window == 0 || closes.len() <= window {
        return out;
    }

    let gains: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = closes.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    // `gains[i]` is the move into `closes[i + 1]`.
    for t in window..closes.len() {
        let lo = t - window;
        let avg_gain = gains[lo..t].iter().sum::<f64>() / window as f64;
        let avg_loss = losses[lo..t].iter().sum::<f64>() / window as f64;
        out[t] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

/// RSI from average gain and loss, with the zero-loss clamp.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_computed_reference() {
        // Deltas: +2 -1 +4 +2 -1 +2 +2 -1 +2 +2 -1 +3 -1 +2
        // gains = 21, losses = 5 -> RS = 4.2 -> RSI = 100 - 100/5.2
        let closes = [
            100.0, 102.0, 101.0, 105.0, 107.0, 106.0, 108.0, 110.0, 109.0, 111.0, 113.0, 112.0,
            115.0, 114.0, 116.0,
        ];
        let out = rsi(&closes, 14);
        assert!(out[..14].iter().all(|v| v.is_none()));
        let expected = 100.0 - 100.0 / 5.2;
        let got = out[14].unwrap();
        assert!((got - expected).abs() < 1e-9, "got {got}, expected {expected}");
        assert!((got - 80.769_230_769).abs() < 1e-6);
    }

    #[test]
    fn no_losses_clamps_to_100() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let out = rsi(&closes, 14);
        for v in out.into_iter().flatten() {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn flat_window_clamps_to_100() {
        let out = rsi(&[10.0; 16], 14);
        assert_eq!(out[14], Some(100.0));
        assert_eq!(out[15], Some(100.0));
    }

    #[test]
    fn only_losses_is_zero() {
        let closes: Vec<f64> = (1..=20).rev().map(|x| x as f64).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out[14], Some(0.0));
    }

    #[test]
    fn bounded_between_0_and_100() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + ((i * 7919) % 23) as f64 - 11.0 + (i as f64 * 0.05).cos() * 3.0)
            .collect();
        for v in rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "rsi out of range: {v}");
        }
    }

    #[test]
    fn too_short_input_yields_no_values() {
        assert!(rsi(&[1.0; 14], 14).iter().all(|v| v.is_none()));
        assert!(rsi(&[], 14).is_empty());
    }
}
