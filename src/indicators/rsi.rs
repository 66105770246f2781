// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split into gains (positive part) and losses (negative part).
// Step 3 — Wilder-smooth both with alpha = 1/period, seeded by the first delta.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Stochastic RSI rescales RSI into [0, 100] against its own rolling range and
// smooths the result twice with simple averages (%K, then %D).
// =============================================================================

use super::smoothing::{diff, rma, rolling_max, rolling_min, safe_div, sma, zip_with, Series};

/// Full RSI series for `closes`; the first bar is undefined.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Series {
    let deltas = diff(closes);
    let gains: Series = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Series = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    let avg_gain = rma(&gains, period);
    let avg_loss = rma(&losses, period);

    zip_with(&avg_gain, &avg_loss, rsi_from_averages)
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - Average loss zero => 100.0 (this includes a market with no movement).
/// - Average gain zero with losses present => 0.0.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

/// %K and %D lines of the Stochastic RSI.
#[derive(Debug, Clone)]
pub struct StochRsi {
    pub k: Series,
    pub d: Series,
}

/// Stochastic RSI over an existing RSI series.
///
/// A flat RSI window (max == min) has no defined position and is undefined.
pub fn calculate_stoch_rsi(rsi: &[Option<f64>], period: usize, k: usize, d: usize) -> StochRsi {
    let lowest = rolling_min(rsi, period);
    let highest = rolling_max(rsi, period);

    let stoch: Series = rsi
        .iter()
        .zip(lowest.iter().zip(&highest))
        .map(|(r, (lo, hi))| match (r, lo, hi) {
            (Some(r), Some(lo), Some(hi)) => safe_div(r - lo, hi - lo).map(|x| x * 100.0),
            _ => None,
        })
        .collect();

    let k_line = sma(&stoch, k);
    let d_line = sma(&k_line, d);

    StochRsi {
        k: k_line,
        d: d_line,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_first_bar_undefined() {
        let rsi = calculate_rsi(&[1.0, 2.0, 3.0], 14);
        assert_eq!(rsi.len(), 3);
        assert_eq!(rsi[0], None);
        assert!(rsi[1].is_some());
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_100() {
        // Zero average loss => 100, even with zero average gain.
        let closes = vec![100.0; 30];
        let rsi = calculate_rsi(&closes, 14);
        assert_eq!(rsi[29], Some(100.0));
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_matches_hand_computed_wilder() {
        // deltas: +2, -1 ; period 2 => alpha 0.5
        // gain: 2, then 0.5*0 + 0.5*2 = 1 ; loss: 0, then 0.5*1 + 0.5*0 = 0.5
        let rsi = calculate_rsi(&[10.0, 12.0, 11.0], 2);
        assert_eq!(rsi[1], Some(100.0));
        let expected = 100.0 - 100.0 / (1.0 + 1.0 / 0.5);
        assert!((rsi[2].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn rsi_from_averages_edges() {
        assert_eq!(rsi_from_averages(0.0, 0.0), Some(100.0));
        assert_eq!(rsi_from_averages(1.0, 0.0), Some(100.0));
        assert_eq!(rsi_from_averages(0.0, 1.0), Some(0.0));
        assert_eq!(rsi_from_averages(1.0, 1.0), Some(50.0));
    }

    #[test]
    fn stoch_rsi_flat_rsi_is_undefined() {
        let rsi = vec![Some(100.0); 30];
        let st = calculate_stoch_rsi(&rsi, 14, 3, 3);
        assert!(st.k.iter().all(Option::is_none));
        assert!(st.d.iter().all(Option::is_none));
    }

    #[test]
    fn stoch_rsi_bounds() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 8.0 + i as f64 * 0.05)
            .collect();
        let rsi = calculate_rsi(&closes, 14);
        let st = calculate_stoch_rsi(&rsi, 14, 3, 3);
        let k = st.k.iter().flatten().count();
        assert!(k > 0);
        for v in st.k.iter().chain(&st.d).flatten() {
            assert!((0.0..=100.0).contains(v), "stoch {v} out of range");
        }
        // %D needs two more bars than %K.
        let first_k = st.k.iter().position(Option::is_some).unwrap();
        let first_d = st.d.iter().position(Option::is_some).unwrap();
        assert_eq!(first_d, first_k + 2);
    }
}
