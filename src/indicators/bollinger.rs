// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// (denominator N).  Derived readings:
//
//   width = (upper - lower) / middle * 100
//   %B    = (close - lower) / (upper - lower)
//
// %B is undefined on a zero-variance window; width is undefined only when the
// middle band is zero.

use super::smoothing::{lift, rolling_std, safe_div, sma, Series};

#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
    pub width: Series,
    pub percent_b: Series,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let src = lift(closes);
    let middle = sma(&src, period);
    let std_dev = rolling_std(&src, period);

    let n = closes.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];
    let mut width = vec![None; n];
    let mut percent_b = vec![None; n];

    for i in 0..n {
        let (Some(mid), Some(sd)) = (middle[i], std_dev[i]) else {
            continue;
        };
        let up = mid + num_std * sd;
        let lo = mid - num_std * sd;
        upper[i] = Some(up);
        lower[i] = Some(lo);
        width[i] = safe_div(up - lo, mid).map(|x| x * 100.0);
        percent_b[i] = calculate_percent_b(closes[i], up, lo);
    }

    BollingerBands {
        upper,
        middle,
        lower,
        width,
        percent_b,
    }
}

/// Position of `close` inside the band: 0.0 at the lower band, 1.0 at the upper.
pub fn calculate_percent_b(close: f64, upper: f64, lower: f64) -> Option<f64> {
    safe_div(close - lower, upper - lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0);
        let up = bb.upper[19].unwrap();
        let mid = bb.middle[19].unwrap();
        let lo = bb.lower[19].unwrap();
        assert!((mid - 10.5).abs() < 1e-12);
        // population σ of 1..=20 = sqrt((20^2 - 1) / 12)
        let sd = ((400.0_f64 - 1.0) / 12.0).sqrt();
        assert!((up - (mid + 2.0 * sd)).abs() < 1e-9);
        assert!((lo - (mid - 2.0 * sd)).abs() < 1e-9);
        assert!(bb.width[19].unwrap() > 0.0);
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bb = calculate_bollinger(&[1.0, 2.0, 3.0], 20, 2.0);
        assert!(bb.middle.iter().all(Option::is_none));
        assert!(bb.percent_b.iter().all(Option::is_none));
    }

    #[test]
    fn percent_b_at_band_edges() {
        assert_eq!(calculate_percent_b(110.0, 110.0, 90.0), Some(1.0));
        assert_eq!(calculate_percent_b(90.0, 110.0, 90.0), Some(0.0));
        assert_eq!(calculate_percent_b(100.0, 110.0, 90.0), Some(0.5));
    }

    #[test]
    fn bollinger_flat_window() {
        let bb = calculate_bollinger(&[100.0; 20], 20, 2.0);
        assert_eq!(bb.width[19], Some(0.0));
        assert_eq!(bb.percent_b[19], None);
    }
}
