// =============================================================================
// Momentum
// =============================================================================
//
// Momentum measures the absolute change in price over a look-back period:
//   MOM = close - close_n
//
// Positive momentum indicates upward pressure; negative indicates downward.

use super::smoothing::Series;

/// Momentum series; the first `period` bars are undefined.
pub fn calculate_momentum(closes: &[f64], period: usize) -> Series {
    (0..closes.len())
        .map(|i| i.checked_sub(period).map(|j| closes[i] - closes[j]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64 * 2.0).collect();
        let mom = calculate_momentum(&closes, 10);
        assert_eq!(mom[9], None);
        // 22 - 2 = 20
        assert_eq!(mom[10], Some(20.0));
        assert_eq!(mom[19], Some(20.0));
    }

    #[test]
    fn momentum_insufficient_data() {
        let mom = calculate_momentum(&[1.0, 2.0, 3.0], 10);
        assert!(mom.iter().all(Option::is_none));
    }

    #[test]
    fn momentum_flat_is_zero() {
        assert_eq!(calculate_momentum(&[5.0; 12], 10)[11], Some(0.0));
    }
}
