// =============================================================================
// Average Directional Index (ADX) / Directional Movement (DMI)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. up = H - prevH, down = prevL - L per bar.
//      +DM = up   if up > down and up > 0, else 0
//      -DM = down if down > up and down > 0, else 0
//      (the first bar has no predecessor and contributes 0 to both)
//   2. Wilder-smooth +DM and -DM; divide by the Wilder ATR:
//      +DI = 100 * RMA(+DM) / ATR,  -DI = 100 * RMA(-DM) / ATR
//   3. DX  = 100 * |+DI - -DI| / (+DI + -DI)
//   4. ADX = RMA(DX)
//
// Bars where ATR or the DI sum is zero are undefined.
// =============================================================================

use super::atr::calculate_atr;
use super::smoothing::{rma, safe_div, zip_with, Series};
use crate::types::Bar;

#[derive(Debug, Clone)]
pub struct Dmi {
    pub plus_di: Series,
    pub minus_di: Series,
    pub adx: Series,
}

/// Directional movement of every bar as `(+DM, -DM)`.
pub fn directional_movement(bars: &[Bar]) -> (Series, Series) {
    let mut plus_dm = Vec::with_capacity(bars.len());
    let mut minus_dm = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let (pdm, mdm) = match i.checked_sub(1).map(|j| &bars[j]) {
            Some(prev) => {
                let up_move = bar.high - prev.high;
                let down_move = prev.low - bar.low;
                let pdm = if up_move > down_move && up_move > 0.0 {
                    up_move
                } else {
                    0.0
                };
                let mdm = if down_move > up_move && down_move > 0.0 {
                    down_move
                } else {
                    0.0
                };
                (pdm, mdm)
            }
            None => (0.0, 0.0),
        };
        plus_dm.push(Some(pdm));
        minus_dm.push(Some(mdm));
    }

    (plus_dm, minus_dm)
}

pub fn calculate_dmi(bars: &[Bar], period: usize) -> Dmi {
    let atr = calculate_atr(bars, period);
    let (plus_dm, minus_dm) = directional_movement(bars);

    let plus_di = zip_with(&rma(&plus_dm, period), &atr, |dm, tr| {
        safe_div(dm, tr).map(|x| 100.0 * x)
    });
    let minus_di = zip_with(&rma(&minus_dm, period), &atr, |dm, tr| {
        safe_div(dm, tr).map(|x| 100.0 * x)
    });

    let dx = zip_with(&plus_di, &minus_di, |p, m| {
        safe_div((p - m).abs(), p + m).map(|x| 100.0 * x)
    });
    let adx = rma(&dx, period);

    Dmi {
        plus_di,
        minus_di,
        adx,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(i: i64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(i * 60, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn directional_movement_takes_dominant_side() {
        let bars = vec![
            candle(0, 10.0, 8.0, 9.0),
            candle(1, 12.0, 7.5, 11.0), // up 2, down 0.5
            candle(2, 11.0, 6.0, 7.0),  // up -1, down 1.5
        ];
        let (p, m) = directional_movement(&bars);
        assert_eq!(p, vec![Some(0.0), Some(2.0), Some(0.0)]);
        assert_eq!(m, vec![Some(0.0), Some(0.0), Some(1.5)]);
    }

    #[test]
    fn adx_strong_uptrend() {
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(i, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();
        let dmi = calculate_dmi(&bars, 14);
        let adx = dmi.adx[59].unwrap();
        assert!(adx > 25.0, "expected ADX > 25 for strong trend, got {adx}");
        assert!(dmi.plus_di[59].unwrap() > dmi.minus_di[59].unwrap());
    }

    #[test]
    fn adx_flat_market_is_undefined() {
        // No range at all => ATR zero => DI undefined.
        let bars: Vec<Bar> = (0..60).map(|i| candle(i, 100.0, 100.0, 100.0)).collect();
        let dmi = calculate_dmi(&bars, 14);
        assert!(dmi.adx.iter().all(Option::is_none));
    }

    #[test]
    fn adx_no_directional_movement_is_undefined() {
        // Identical candles with range: DI both zero => DX undefined.
        let bars: Vec<Bar> = (0..60).map(|i| candle(i, 101.0, 99.0, 100.0)).collect();
        let dmi = calculate_dmi(&bars, 14);
        assert_eq!(dmi.plus_di[59], Some(0.0));
        assert_eq!(dmi.adx[59], None);
    }

    #[test]
    fn adx_result_range() {
        let bars: Vec<Bar> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                candle(i, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        for v in calculate_dmi(&bars, 14).adx.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "ADX {v} out of [0,100] range");
        }
    }
}
