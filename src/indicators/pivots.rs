// =============================================================================
// Classic Floor-Trader Pivots
// =============================================================================
//
// Computed from the previous completed bar's high / low / close:
//
//   P  = (H + L + C) / 3
//   R1 = 2P - L          S1 = 2P - H
//   R2 = P + (H - L)     S2 = P - (H - L)
//   R3 = H + 2(P - L)    S3 = L - 2(H - P)

use crate::types::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub s1: f64,
    pub r2: f64,
    pub s2: f64,
    pub r3: f64,
    pub s3: f64,
}

impl PivotLevels {
    pub fn from_bar(bar: &Bar) -> Self {
        let (h, l, c) = (bar.high, bar.low, bar.close);
        let pivot = (h + l + c) / 3.0;
        Self {
            pivot,
            r1: 2.0 * pivot - l,
            s1: 2.0 * pivot - h,
            r2: pivot + (h - l),
            s2: pivot - (h - l),
            r3: h + 2.0 * (pivot - l),
            s3: l - 2.0 * (h - pivot),
        }
    }
}

/// Levels for the current bar, derived from the one before it.
///
/// Returns `None` when fewer than two bars are available.
pub fn classic_pivots(bars: &[Bar]) -> Option<PivotLevels> {
    let prev = bars.len().checked_sub(2).map(|i| &bars[i])?;
    Some(PivotLevels::from_bar(prev))
}
