// =============================================================================
// Volume-Based Indicators
// =============================================================================
//
// CMF  — Chaikin Money Flow:
//          mfm = ((close - low) - (high - close)) / (high - low)
//          CMF = Σ(mfm * volume, n) / Σ(volume, n)
// MFI  — Money Flow Index (volume-weighted RSI over the typical price):
//          positive flow = Σ(tp * volume) over bars where tp rose
//          negative flow = Σ(tp * volume) over bars where tp fell
//          MFI = 100 - 100 / (1 + positive / negative)
// OBV  — On-Balance Volume: running Σ sign(Δclose) * volume, starting at 0.
// RVOL — Relative volume: volume / SMA(volume, n) of the n bars *before*
//        the current one.
//
// Series without any volume leave the ratio-based readings undefined.
// =============================================================================

use super::smoothing::{lift, rolling_sum, safe_div, shift, sma, zip_with, Series};
use crate::types::Bar;

pub fn calculate_cmf(bars: &[Bar], period: usize) -> Series {
    let flow_volume: Series = bars
        .iter()
        .map(|b| {
            let mfm = safe_div(2.0 * b.close - b.low - b.high, b.high - b.low)?;
            Some(mfm * b.volume)
        })
        .collect();
    let volume: Series = bars.iter().map(|b| Some(b.volume)).collect();

    zip_with(
        &rolling_sum(&flow_volume, period),
        &rolling_sum(&volume, period),
        safe_div,
    )
}

pub fn calculate_mfi(bars: &[Bar], period: usize) -> Series {
    let mut positive: Series = Vec::with_capacity(bars.len());
    let mut negative: Series = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let tp = bar.typical_price();
        match i.checked_sub(1).map(|j| bars[j].typical_price()) {
            Some(prev_tp) => {
                let flow = tp * bar.volume;
                positive.push(Some(if tp > prev_tp { flow } else { 0.0 }));
                negative.push(Some(if tp < prev_tp { flow } else { 0.0 }));
            }
            None => {
                positive.push(None);
                negative.push(None);
            }
        }
    }

    zip_with(
        &rolling_sum(&positive, period),
        &rolling_sum(&negative, period),
        mfi_from_flows,
    )
}

/// Zero negative flow with positive flow present reads 100; no flow at all is
/// undefined.
fn mfi_from_flows(positive: f64, negative: f64) -> Option<f64> {
    if negative == 0.0 {
        return (positive > 0.0).then_some(100.0);
    }
    let ratio = positive / negative;
    let mfi = 100.0 - 100.0 / (1.0 + ratio);
    mfi.is_finite().then_some(mfi)
}

pub fn calculate_obv(bars: &[Bar]) -> Series {
    let mut total = 0.0;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if let Some(prev) = i.checked_sub(1).map(|j| &bars[j]) {
                let delta = bar.close - prev.close;
                if delta > 0.0 {
                    total += bar.volume;
                } else if delta < 0.0 {
                    total -= bar.volume;
                }
            }
            Some(total)
        })
        .collect()
}

pub fn calculate_relative_volume(volumes: &[f64], period: usize) -> Series {
    let src = lift(volumes);
    let prior_avg = sma(&shift(&src, 1), period);
    zip_with(&src, &prior_avg, safe_div)
}
