// =============================================================================
// AlphaTrend — money-flow gated ratchet band
// =============================================================================
//
//   ATR   = SMA(true range, period)        (plain average, not Wilder)
//   up_t  = low  - coeff * ATR
//   down_t = high + coeff * ATR
//
//   gate >= 50 (buying pressure):  value = max(prev, up_t)    ratchets up
//   gate <  50 (selling pressure): value = min(prev, down_t)  ratchets down
//
// The gate is MFI(period); series without any volume use RSI(period) instead.
// The first bar with both ATR and gate defined starts at its candidate band.
// Bars where either input is undefined carry the previous value.
//
// Direction and signals compare the value with itself two bars earlier:
//   buy  = crossover(value, value[2])
//   sell = crossunder(value, value[2])
// =============================================================================

use super::atr::calculate_atr_sma;
use super::rsi::calculate_rsi;
use super::smoothing::Series;
use super::supertrend::{TrendDirection, TrendSignal};
use super::volume::calculate_mfi;
use crate::types::Bar;

const GATE_THRESHOLD: f64 = 50.0;

/// Recursive state carried from bar to bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaTrendState {
    /// Gate reading (MFI or RSI) of the bar.
    pub gate: f64,
    pub value: f64,
}

impl AlphaTrendState {
    /// Next state from the previous value (if any) and this bar's inputs.
    pub fn step(prev: Option<f64>, bar: &Bar, atr: f64, gate: f64, coeff: f64) -> Self {
        let value = if gate >= GATE_THRESHOLD {
            let floor = bar.low - coeff * atr;
            match prev {
                Some(p) if floor < p => p,
                _ => floor,
            }
        } else {
            let ceiling = bar.high + coeff * atr;
            match prev {
                Some(p) if ceiling > p => p,
                _ => ceiling,
            }
        };
        Self { gate, value }
    }
}

/// Gate series: MFI when the bars carry volume, RSI otherwise.
pub fn alphatrend_gate(bars: &[Bar], period: usize) -> Series {
    if bars.iter().any(|b| b.volume > 0.0) {
        calculate_mfi(bars, period)
    } else {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        calculate_rsi(&closes, period)
    }
}

pub fn calculate_alphatrend(bars: &[Bar], period: usize, coeff: f64) -> Series {
    let gate = alphatrend_gate(bars, period);
    calculate_alphatrend_with_gate(bars, period, coeff, &gate)
}

/// AlphaTrend over an explicit gate series aligned with `bars`.
pub fn calculate_alphatrend_with_gate(
    bars: &[Bar],
    period: usize,
    coeff: f64,
    gate: &[Option<f64>],
) -> Series {
    let atr = calculate_atr_sma(bars, period);

    bars.iter()
        .zip(atr.iter().zip(gate))
        .scan(None::<f64>, |prev, (bar, (atr, gate))| {
            if let (Some(atr), Some(gate)) = (atr, gate) {
                *prev = Some(AlphaTrendState::step(*prev, bar, *atr, *gate, coeff).value);
            }
            Some(*prev)
        })
        .collect()
}

fn lagged(values: &[Option<f64>], i: usize, lag: usize) -> Option<f64> {
    i.checked_sub(lag).and_then(|j| values[j])
}

/// Direction at bar `i`: the value against two bars earlier, falling back to
/// the previous bar's comparison on a tie.
pub fn alphatrend_direction(values: &[Option<f64>], i: usize) -> Option<TrendDirection> {
    let now = lagged(values, i, 0)?;
    let two_back = lagged(values, i, 2)?;
    if now > two_back {
        return Some(TrendDirection::Up);
    }
    if now < two_back {
        return Some(TrendDirection::Down);
    }
    let prev = lagged(values, i, 1)?;
    let three_back = lagged(values, i, 3)?;
    Some(if prev > three_back {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    })
}

/// Crossover / crossunder of the value against itself two bars earlier.
pub fn alphatrend_signal(values: &[Option<f64>], i: usize) -> Option<TrendSignal> {
    let now = lagged(values, i, 0)?;
    let prev = lagged(values, i, 1)?;
    let two_back = lagged(values, i, 2)?;
    let three_back = lagged(values, i, 3)?;

    if now > two_back && prev <= three_back {
        Some(TrendSignal::Buy)
    } else if now < two_back && prev >= three_back {
        Some(TrendSignal::Sell)
    } else {
        None
    }
}
