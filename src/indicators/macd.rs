// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   line      = EMA(close, fast) - EMA(close, slow)
//   signal    = EMA(line, signal)
//   histogram = line - signal
//
// All three EMAs are seeded with their first sample (no SMA seed window).

use super::smoothing::{ema, lift, zip_with, Series};

#[derive(Debug, Clone)]
pub struct Macd {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let src = lift(closes);
    let fast_ema = ema(&src, fast);
    let slow_ema = ema(&src, slow);

    let line = zip_with(&fast_ema, &slow_ema, |f, s| Some(f - s));
    let signal_line = ema(&line, signal);
    let histogram = zip_with(&line, &signal_line, |l, s| Some(l - s));

    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_flat_is_zero() {
        let m = calculate_macd(&[50.0; 40], 12, 26, 9);
        for s in [&m.line, &m.signal, &m.histogram] {
            assert!(s.iter().all(|v| v.map_or(false, |v| v.abs() < 1e-12)));
        }
    }

    #[test]
    fn macd_rising_series_is_positive() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let m = calculate_macd(&closes, 12, 26, 9);
        let line = m.line[99].unwrap();
        let signal = m.signal[99].unwrap();
        assert!(line > 0.0);
        // Signal lags the line on a steady trend.
        assert!(line >= signal);
        assert!((m.histogram[99].unwrap() - (line - signal)).abs() < 1e-12);
    }
}
