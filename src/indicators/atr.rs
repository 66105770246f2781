// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR_0 = H - L
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// Two averages of TR are in use:
//   calculate_atr      — Wilder's RMA (ATR, ADX, Supertrend)
//   calculate_atr_sma  — plain simple average (AlphaTrend)
// =============================================================================

use super::smoothing::{rma, sma, Series};
use crate::types::Bar;

/// True range of every bar; the first bar falls back to `high - low`.
pub fn true_range(bars: &[Bar]) -> Series {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            let tr = match i.checked_sub(1).map(|j| bars[j].close) {
                Some(prev_close) => hl
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs()),
                None => hl,
            };
            tr.is_finite().then_some(tr)
        })
        .collect()
}

/// Wilder-smoothed ATR series.
pub fn calculate_atr(bars: &[Bar], period: usize) -> Series {
    rma(&true_range(bars), period)
}

/// Simple-average ATR series.
pub fn calculate_atr_sma(bars: &[Bar], period: usize) -> Series {
    sma(&true_range(bars), period)
}
