// =============================================================================
// Commodity Channel Index (CCI)
// =============================================================================
//
//   tp  = (high + low + close) / 3
//   CCI = (tp - SMA(tp, n)) / (0.015 * MeanDev(tp, n))

use super::smoothing::{rolling_mean_dev, safe_div, sma, Series};
use crate::types::Bar;

const LAMBERT: f64 = 0.015;

pub fn calculate_cci(bars: &[Bar], period: usize) -> Series {
    let tp: Series = bars.iter().map(|b| Some(b.typical_price())).collect();
    let mean = sma(&tp, period);
    let dev = rolling_mean_dev(&tp, period);

    tp.iter()
        .zip(mean.iter().zip(&dev))
        .map(|(t, (m, d))| match (t, m, d) {
            (Some(t), Some(m), Some(d)) => safe_div(t - m, LAMBERT * d),
            _ => None,
        })
        .collect()
}
