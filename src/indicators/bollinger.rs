//! Bollinger Bands.
//!
//! `middle` is the trailing SMA over `window` closes; the bands sit `k`
//! population standard deviations above and below it.

use crate::math::{rolling_mean, rolling_std_population};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub std: f64,
}

/// Bands for every index; `None` until `window` closes are available.
pub fn bollinger(closes: &[f64], window: usize, k: f64) -> Vec<Option<Band>> {
    let means = rolling_mean(closes, window);
    let stds = rolling_std_population(closes, window);
    means
        .into_iter()
        .zip(stds)
        .map(|(mean, std)| {
            let (middle, std) = (mean?, std?);
            Some(Band {
                middle,
                upper: middle + k * std,
                lower: middle - k * std,
                std,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_width_is_four_std() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin() * 4.0).collect();
        let bands = bollinger(&closes, 20, 2.0);
        assert!(bands[..19].iter().all(|b| b.is_none()));
        for band in bands.into_iter().flatten() {
            assert!((band.upper - band.lower - 4.0 * band.std).abs() < 1e-9);
            assert!(band.lower <= band.middle && band.middle <= band.upper);
        }
    }

    #[test]
    fn known_window() {
        let closes = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let band = bollinger(&closes, 8, 2.0)[7].unwrap();
        assert!((band.middle - 5.0).abs() < 1e-12);
        assert!((band.std - 2.0).abs() < 1e-12);
        assert!((band.upper - 9.0).abs() < 1e-12);
        assert!((band.lower - 1.0).abs() < 1e-12);
    }
}
