// =============================================================================
// Moving-Average Bank
// =============================================================================
//
// SMA, EMA and WMA of the close at every configured period.  A period longer
// than the series is reported as insufficient history for that period only;
// the rest of the bank is still computed.
//
// The EMA is seeded with the first close (no SMA seed window), so it is
// computed over the whole series once the period fits.

use super::smoothing::{ema, lift, sma, wma};

/// Latest SMA / EMA / WMA at one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverages {
    pub sma: f64,
    pub ema: f64,
    pub wma: f64,
}

/// Latest readings at `period`, or `None` when the series is shorter than it.
pub fn moving_averages_at(closes: &[f64], period: usize) -> Option<MovingAverages> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let src = lift(closes);
    Some(MovingAverages {
        sma: (*sma(&src, period).last()?)?,
        ema: (*ema(&src, period).last()?)?,
        wma: (*wma(&src, period).last()?)?,
    })
}

/// One entry per requested period, in the given order.
pub fn moving_average_bank(
    closes: &[f64],
    periods: &[usize],
) -> Vec<(usize, Option<MovingAverages>)> {
    periods
        .iter()
        .map(|&p| (p, moving_averages_at(closes, p)))
        .collect()
}
