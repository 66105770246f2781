// =============================================================================
// RSI Divergence Scanner
// =============================================================================
//
// Step 1 — Pivots.  Bar `i` is a pivot low (high) of the oscillator when its
//          value is the minimum (maximum) of the window [i - left, i + right].
//          A pivot is only known once `right` later bars exist.
// Step 2 — Pairing.  For every pivot at `i`, the nearest earlier pivot of the
//          same kind at `j` with  range_lower <= i - j <= range_upper.
// Step 3 — Classification.
//          bullish: osc[i] > osc[j]  and  low[i]  < low[j]   (higher low vs lower low)
//          bearish: osc[i] < osc[j]  and  high[i] > high[j]  (lower high vs higher high)
//
// `bars_ago` counts from the bar that confirmed the pivot (i + right) to the
// last bar, so it trails the pivot itself by `right` bars.
// =============================================================================

use std::fmt;

use crate::config::DivergenceParams;
use crate::types::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotKind {
    Low,
    High,
}

/// A confirmed local extreme of an oscillator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceKind {
    Bullish,
    Bearish,
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub kind: DivergenceKind,
    /// Bars between the pivot's confirmation and the last bar.
    pub bars_ago: usize,
    /// Bar of the later pivot.
    pub pivot_index: usize,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} bars ago", self.kind, self.bars_ago)
    }
}

/// Confirmed pivots of `values`, oldest first.
///
/// Windows touching an undefined value are skipped.
pub fn find_pivots(
    values: &[Option<f64>],
    left: usize,
    right: usize,
    kind: PivotKind,
) -> Vec<Pivot> {
    let n = values.len();
    if n < left + right + 1 {
        return Vec::new();
    }

    (left..n - right)
        .filter_map(|i| {
            let value = values[i]?;
            let window = &values[i - left..=i + right];
            let is_extreme = window.iter().all(|w| match (w, kind) {
                (Some(w), PivotKind::Low) => *w >= value,
                (Some(w), PivotKind::High) => *w <= value,
                (None, _) => false,
            });
            is_extreme.then_some(Pivot { index: i, value })
        })
        .collect()
}

/// Nearest pivot before `pivots[at]` whose distance lies in
/// `[range_lower, range_upper]`.
fn earlier_in_range(
    pivots: &[Pivot],
    at: usize,
    range_lower: usize,
    range_upper: usize,
) -> Option<&Pivot> {
    let current = pivots[at].index;
    pivots[..at]
        .iter()
        .rev()
        .map(|p| (p, current - p.index))
        .skip_while(|(_, dist)| *dist < range_lower)
        .take_while(|(_, dist)| *dist <= range_upper)
        .map(|(p, _)| p)
        .next()
}

/// Bar indices of every pivot that diverges from its paired earlier pivot.
///
/// `price` is the low series for [`PivotKind::Low`] and the high series for
/// [`PivotKind::High`].
pub fn divergent_pivots(
    pivots: &[Pivot],
    price: &[f64],
    kind: PivotKind,
    range_lower: usize,
    range_upper: usize,
) -> Vec<usize> {
    (0..pivots.len())
        .filter_map(|at| {
            let cur = &pivots[at];
            let prev = earlier_in_range(pivots, at, range_lower, range_upper)?;
            let diverges = match kind {
                PivotKind::Low => cur.value > prev.value && price[cur.index] < price[prev.index],
                PivotKind::High => cur.value < prev.value && price[cur.index] > price[prev.index],
            };
            diverges.then_some(cur.index)
        })
        .collect()
}

/// Most recent divergence between `osc` and price.
///
/// When both a bullish and a bearish divergence exist the nearer one wins;
/// on a tie the bullish one is reported.
pub fn detect_divergence(
    osc: &[Option<f64>],
    bars: &[Bar],
    params: &DivergenceParams,
) -> Option<Divergence> {
    let last = bars.len().checked_sub(1)?;
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();

    let latest = |kind: PivotKind, price: &[f64], label: DivergenceKind| {
        let pivots = find_pivots(osc, params.left, params.right, kind);
        let (lower, upper) = (params.range_lower, params.range_upper);
        let index = *divergent_pivots(&pivots, price, kind, lower, upper).last()?;
        Some(Divergence {
            kind: label,
            bars_ago: last.saturating_sub(index + params.right),
            pivot_index: index,
        })
    };

    let bullish = latest(PivotKind::Low, &lows, DivergenceKind::Bullish);
    let bearish = latest(PivotKind::High, &highs, DivergenceKind::Bearish);

    match (bullish, bearish) {
        (Some(bull), Some(bear)) if bear.bars_ago < bull.bars_ago => Some(bear),
        (bull, bear) => bull.or(bear),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::rsi::calculate_rsi;
    use chrono::{TimeZone, Utc};

    fn candle(i: usize, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(i as i64 * 86_400, 0).unwrap(),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1.0,
        }
    }

    fn pivot(index: usize, value: f64) -> Pivot {
        Pivot { index, value }
    }

    fn indices(pivots: &[Pivot]) -> Vec<usize> {
        pivots.iter().map(|p| p.index).collect()
    }

    /// Oscillator troughs at 20 (30.0) and 45 (40.0), peak at 33.
    fn engineered_osc() -> Vec<Option<f64>> {
        (0..60)
            .map(|i: i64| {
                let v = if i <= 32 {
                    30.0 + 2.0 * (i - 20).abs() as f64
                } else {
                    40.0 + 2.0 * (i - 45).abs() as f64
                };
                Some(v)
            })
            .collect()
    }

    #[test]
    fn pivots_of_engineered_oscillator() {
        let osc = engineered_osc();
        let lows = find_pivots(&osc, 5, 5, PivotKind::Low);
        assert_eq!(indices(&lows), vec![20, 45]);
        let highs = find_pivots(&osc, 5, 5, PivotKind::High);
        assert_eq!(indices(&highs), vec![33]);
    }

    #[test]
    fn pivots_need_right_confirmation() {
        let mut osc = engineered_osc();
        osc.truncate(49); // pivot at 45 lacks its 5 confirming bars
        let lows = find_pivots(&osc, 5, 5, PivotKind::Low);
        assert_eq!(indices(&lows), vec![20]);
    }

    #[test]
    fn pivots_skip_undefined_windows() {
        let mut osc = engineered_osc();
        osc[18] = None;
        let lows = find_pivots(&osc, 5, 5, PivotKind::Low);
        assert_eq!(indices(&lows), vec![45]);
    }

    #[test]
    fn bullish_divergence_on_engineered_pattern() {
        let osc = engineered_osc();
        let mut bars: Vec<Bar> = (0..60).map(|i| candle(i, 100.0)).collect();
        bars[20].low = 90.0;
        bars[45].low = 85.0;

        let params = DivergenceParams::default();
        let d = detect_divergence(&osc, &bars, &params).unwrap();
        assert_eq!(d.kind, DivergenceKind::Bullish);
        assert_eq!(d.pivot_index, 45);
        // 14 bars since the trough, minus the 5-bar confirmation lag.
        assert_eq!(d.bars_ago, 9);
        assert_eq!(d.to_string(), "Bullish 9 bars ago");
    }

    #[test]
    fn no_divergence_when_price_confirms() {
        let osc = engineered_osc();
        let mut bars: Vec<Bar> = (0..60).map(|i| candle(i, 100.0)).collect();
        bars[20].low = 85.0;
        bars[45].low = 90.0; // higher low in price too
        let params = DivergenceParams::default();
        assert_eq!(detect_divergence(&osc, &bars, &params), None);
    }

    #[test]
    fn earlier_pivot_outside_range_is_ignored() {
        let pivots = vec![pivot(0, 10.0), pivot(70, 20.0), pivot(73, 30.0)];
        // 73 pairs with nothing: 70 is too close, 0 is too far.
        // 70 pairs with nothing: 0 is 70 bars back.
        let price = vec![50.0; 80];
        let found = divergent_pivots(&pivots, &price, PivotKind::Low, 5, 60);
        assert!(found.is_empty());
    }

    #[test]
    fn too_close_pivot_is_skipped_for_an_older_one() {
        let pivots = vec![pivot(10, 10.0), pivot(38, 5.0), pivot(40, 20.0)];
        let mut price = vec![50.0; 50];
        price[10] = 60.0;
        price[40] = 55.0;
        // 40 skips 38 (2 bars) and pairs with 10 (30 bars): higher osc, lower price.
        let found = divergent_pivots(&pivots, &price, PivotKind::Low, 5, 60);
        assert_eq!(found, vec![40]);
    }

    #[test]
    fn bearish_divergence_mirrors_bullish() {
        let osc: Vec<Option<f64>> = engineered_osc()
            .into_iter()
            .map(|v| v.map(|v| 100.0 - v))
            .collect();
        let mut bars: Vec<Bar> = (0..60).map(|i| candle(i, 100.0)).collect();
        bars[20].high = 110.0;
        bars[45].high = 115.0;
        let params = DivergenceParams::default();
        let d = detect_divergence(&osc, &bars, &params).unwrap();
        assert_eq!(d.kind, DivergenceKind::Bearish);
        assert_eq!(d.bars_ago, 9);
    }

    #[test]
    fn bullish_divergence_from_price_driven_rsi() {
        // Fall to a low at bar 40, bounce, then a deeper but slower low at
        // bar 65 while RSI makes a higher low, then recover.
        let mut closes = Vec::new();
        for i in 0..=40 {
            closes.push(100.0 - i as f64);
        }
        for i in 1..=10 {
            closes.push(60.0 + i as f64);
        }
        for i in 1..=15 {
            closes.push(70.0 - 1.5 * i as f64);
        }
        for i in 1..=14 {
            closes.push(47.5 + i as f64);
        }
        assert_eq!(closes.len(), 80);

        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| candle(i, c))
            .collect();
        let rsi = calculate_rsi(&closes, 14);
        let params = DivergenceParams::default();
        let d = detect_divergence(&rsi, &bars, &params).unwrap();

        assert_eq!(d.kind, DivergenceKind::Bullish);
        assert_eq!(d.pivot_index, 65);
        let engineered = 79 - 65;
        assert!(d.bars_ago <= engineered && engineered - d.bars_ago <= 5);
    }
}
