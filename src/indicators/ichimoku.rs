// =============================================================================
// Ichimoku Cloud
// =============================================================================
//
//   conversion (tenkan) = midpoint of highest high / lowest low over 9 bars
//   base (kijun)        = same over 26 bars
//   leading span A      = midpoint(conversion, base), plotted 26 bars ahead
//   leading span B      = midpoint over 52 bars, plotted 26 bars ahead
//
// The spans are returned already displaced, i.e. the value at bar `i` is the
// one computed at bar `i - displacement`, which is the cloud drawn under bar
// `i`.

use std::fmt;

use super::smoothing::{lift, rolling_max, rolling_min, shift, zip_with, Series};
use crate::config::IchimokuParams;
use crate::types::Bar;

#[derive(Debug, Clone)]
pub struct Ichimoku {
    pub conversion: Series,
    pub base: Series,
    pub span_a: Series,
    pub span_b: Series,
}

/// Cloud colour under a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudTrend {
    Rising,
    Falling,
}

impl CloudTrend {
    pub fn classify(span_a: f64, span_b: f64) -> Self {
        if span_a > span_b {
            Self::Rising
        } else {
            Self::Falling
        }
    }
}

impl fmt::Display for CloudTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rising => write!(f, "rising"),
            Self::Falling => write!(f, "falling"),
        }
    }
}

fn donchian_mid(highs: &Series, lows: &Series, period: usize) -> Series {
    zip_with(
        &rolling_max(highs, period),
        &rolling_min(lows, period),
        |h, l| Some((h + l) / 2.0),
    )
}

pub fn calculate_ichimoku(bars: &[Bar], params: &IchimokuParams) -> Ichimoku {
    let highs = lift(&bars.iter().map(|b| b.high).collect::<Vec<_>>());
    let lows = lift(&bars.iter().map(|b| b.low).collect::<Vec<_>>());

    let conversion = donchian_mid(&highs, &lows, params.conversion);
    let base = donchian_mid(&highs, &lows, params.base);
    let lead_a = zip_with(&conversion, &base, |c, b| Some((c + b) / 2.0));
    let lead_b = donchian_mid(&highs, &lows, params.span_b);

    Ichimoku {
        span_a: shift(&lead_a, params.displacement),
        span_b: shift(&lead_b, params.displacement),
        conversion,
        base,
    }
}
