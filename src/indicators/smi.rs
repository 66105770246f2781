// =============================================================================
// Stochastic Momentum Index (SMI)
// =============================================================================
//
// Distance of the close from the midpoint of the recent high/low range,
// normalised by that range:
//
//   range    = highest(high, n) - lowest(low, n)
//   relative = close - (highest + lowest) / 2
//   SMI      = 200 * EMA(EMA(relative, s), s) / EMA(EMA(range, s), s)
//
// A zero smoothed range leaves the bar undefined.

use super::smoothing::{ema, lift, rolling_max, rolling_min, safe_div, zip_with, Series};
use crate::types::Bar;

pub fn calculate_smi(bars: &[Bar], period: usize, smoothing: usize) -> Series {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let hh = rolling_max(&lift(&highs), period);
    let ll = rolling_min(&lift(&lows), period);

    let range = zip_with(&hh, &ll, |h, l| Some(h - l));
    let midpoint = zip_with(&hh, &ll, |h, l| Some((h + l) / 2.0));
    let relative = zip_with(&lift(&closes), &midpoint, |c, m| Some(c - m));

    let rel_smooth = ema(&ema(&relative, smoothing), smoothing);
    let range_smooth = ema(&ema(&range, smoothing), smoothing);

    zip_with(&rel_smooth, &range_smooth, |r, h| {
        safe_div(r, h).map(|x| 200.0 * x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(i: i64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(i * 86_400, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn smi_warms_up_over_period() {
        let bars: Vec<Bar> = (0..30)
            .map(|i| {
                let c = 100.0 + i as f64;
                candle(i, c + 1.0, c - 1.0, c)
            })
            .collect();
        let smi = calculate_smi(&bars, 10, 3);
        assert_eq!(smi[8], None);
        assert!(smi[9].is_some());
    }

    #[test]
    fn smi_close_at_high_is_positive_and_bounded() {
        let bars: Vec<Bar> = (0..40)
            .map(|i| {
                let c = 100.0 + i as f64;
                candle(i, c, c - 2.0, c)
            })
            .collect();
        let v = calculate_smi(&bars, 10, 3)[39].unwrap();
        assert!(v > 0.0 && v <= 100.0 + 1e-9, "SMI {v}");
    }

    #[test]
    fn smi_flat_range_is_undefined() {
        let bars: Vec<Bar> = (0..30).map(|i| candle(i, 10.0, 10.0, 10.0)).collect();
        assert!(calculate_smi(&bars, 10, 3).iter().all(Option::is_none));
    }
}
