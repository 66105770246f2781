// =============================================================================
// Supertrend — ATR-banded trend flip
// =============================================================================
//
// Basic bands around the bar's median price:
//   basic_upper = hl2 + factor * ATR        (ATR = Wilder RMA of true range)
//   basic_lower = hl2 - factor * ATR
//
// Final bands only tighten towards price, and reset once price closes
// through them:
//   final_upper = basic_upper  if basic_upper < prev.final_upper
//                                 or prev_close > prev.final_upper
//                 prev.final_upper otherwise
//   final_lower = basic_lower  if basic_lower > prev.final_lower
//                                 or prev_close < prev.final_lower
//                 prev.final_lower otherwise
//
// Direction:
//   was down (tracking the upper band) -> up   if close > final_upper
//   was up   (tracking the lower band) -> down if close < final_lower
//
// The reported value is the lower band in an uptrend and the upper band in a
// downtrend.  The first bar seeds both final bands from its basic bands with
// a downtrend.
//
// Every bar depends on the previous bar's final state, so the series is a
// strict left fold over the bars.
// =============================================================================

use std::fmt;

use super::atr::calculate_atr;
use crate::types::Bar;

/// Direction of a trend-following indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Uptrend"),
            Self::Down => write!(f, "Downtrend"),
        }
    }
}

/// Entry signal emitted when a trend-following indicator flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendSignal {
    Buy,
    Sell,
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Per-bar recursive state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupertrendState {
    pub final_upper: f64,
    pub final_lower: f64,
    pub direction: TrendDirection,
    pub value: f64,
}

impl SupertrendState {
    /// State of the first bar with a defined ATR.
    pub fn seed(median: f64, atr: f64, factor: f64) -> Self {
        let final_upper = median + factor * atr;
        let final_lower = median - factor * atr;
        Self {
            final_upper,
            final_lower,
            direction: TrendDirection::Down,
            value: final_upper,
        }
    }

    /// State of the next bar given this bar's state and close.
    pub fn step(&self, prev_close: f64, median: f64, close: f64, atr: f64, factor: f64) -> Self {
        let basic_upper = median + factor * atr;
        let basic_lower = median - factor * atr;

        let final_lower = if basic_lower > self.final_lower || prev_close < self.final_lower {
            basic_lower
        } else {
            self.final_lower
        };
        let final_upper = if basic_upper < self.final_upper || prev_close > self.final_upper {
            basic_upper
        } else {
            self.final_upper
        };

        let direction = match self.direction {
            TrendDirection::Down if close > final_upper => TrendDirection::Up,
            TrendDirection::Up if close < final_lower => TrendDirection::Down,
            unchanged => unchanged,
        };

        let value = match direction {
            TrendDirection::Up => final_lower,
            TrendDirection::Down => final_upper,
        };

        Self {
            final_upper,
            final_lower,
            direction,
            value,
        }
    }
}

/// Supertrend state of every bar, `None` until the ATR is defined.
pub fn calculate_supertrend(
    bars: &[Bar],
    atr_period: usize,
    factor: f64,
) -> Vec<Option<SupertrendState>> {
    let atr = calculate_atr(bars, atr_period);

    bars.iter()
        .zip(&atr)
        .enumerate()
        .scan(None::<SupertrendState>, |prev, (i, (bar, atr))| {
            let next = match (*prev, *atr) {
                (_, None) => None,
                (None, Some(atr)) => Some(SupertrendState::seed(bar.median_price(), atr, factor)),
                (Some(state), Some(atr)) => {
                    let prev_close = bars[i - 1].close;
                    Some(state.step(prev_close, bar.median_price(), bar.close, atr, factor))
                }
            };
            if next.is_some() {
                *prev = next;
            }
            Some(next)
        })
        .collect()
}

/// Signal fired on the last bar if the direction flipped there.
pub fn supertrend_signal(states: &[Option<SupertrendState>]) -> Option<TrendSignal> {
    let [.., Some(prev), Some(last)] = states else {
        return None;
    };
    match (prev.direction, last.direction) {
        (TrendDirection::Down, TrendDirection::Up) => Some(TrendSignal::Buy),
        (TrendDirection::Up, TrendDirection::Down) => Some(TrendSignal::Sell),
        _ => None,
    }
}
