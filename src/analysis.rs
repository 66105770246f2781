// =============================================================================
// Technical Analysis — result assembly
// =============================================================================
//
// Runs every indicator over one instrument's validated price series and maps
// the most recent reading of each into a flat, ordered `IndicatorReport`.
//
// Degradation is per entry:
//   series shorter than the indicator's window  -> "insufficient history"
//   window full but arithmetic degenerate        -> "unavailable"
// Only an empty, malformed or too-short series fails the whole call.

use tracing::{debug, trace};

use crate::config::{
    AlphaTrendParams, DivergenceParams, EngineConfig, IchimokuParams, MacdParams, RsiParams,
    SupertrendParams,
};
use crate::error::EngineError;
use crate::indicators::adx::{calculate_dmi, Dmi};
use crate::indicators::alphatrend::{alphatrend_direction, alphatrend_signal, calculate_alphatrend};
use crate::indicators::atr::calculate_atr;
use crate::indicators::bollinger::{calculate_bollinger, BollingerBands};
use crate::indicators::cci::calculate_cci;
use crate::indicators::divergence::detect_divergence;
use crate::indicators::ichimoku::{calculate_ichimoku, CloudTrend, Ichimoku};
use crate::indicators::macd::{calculate_macd, Macd};
use crate::indicators::momentum::calculate_momentum;
use crate::indicators::moving_averages::{moving_average_bank, MovingAverages};
use crate::indicators::pivots::classic_pivots;
use crate::indicators::rsi::{calculate_rsi, calculate_stoch_rsi, StochRsi};
use crate::indicators::smi::calculate_smi;
use crate::indicators::smoothing::sma;
use crate::indicators::supertrend::{
    calculate_supertrend, supertrend_signal, SupertrendState, TrendDirection,
};
use crate::indicators::volume::{
    calculate_cmf, calculate_mfi, calculate_obv, calculate_relative_volume,
};
use crate::types::{Bar, IndicatorReport, IndicatorValue, PriceSeries};

/// A reading, or the reason it is missing.
type Reading<T> = Result<T, IndicatorValue>;

const NO_SIGNAL: &str = "none";

// =============================================================================
// Reading helpers
// =============================================================================

/// Latest value of `values` when the series has at least `required` bars.
fn latest(values: &[Option<f64>], required: usize) -> Reading<f64> {
    if values.len() < required {
        return Err(IndicatorValue::InsufficientHistory);
    }
    match values.last().copied().flatten() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(IndicatorValue::Undefined),
    }
}

/// Why a reading is missing on a series of `bars` bars.
fn shortfall(bars: usize, required: usize) -> IndicatorValue {
    if bars < required {
        IndicatorValue::InsufficientHistory
    } else {
        IndicatorValue::Undefined
    }
}

fn enough<T>(bars: usize, required: usize, value: Option<T>) -> Reading<T> {
    if bars < required {
        return Err(IndicatorValue::InsufficientHistory);
    }
    value.ok_or(IndicatorValue::Undefined)
}

fn number(reading: Reading<f64>) -> IndicatorValue {
    reading.map_or_else(|missing| missing, IndicatorValue::number)
}

fn text(reading: Reading<String>) -> IndicatorValue {
    reading.map_or_else(|missing| missing, IndicatorValue::Text)
}

fn signal_text(signal: Option<impl std::fmt::Display>) -> String {
    match signal {
        Some(sig) => format!("New {sig} signal"),
        None => NO_SIGNAL.to_string(),
    }
}

// =============================================================================
// Composite entries
// =============================================================================

fn rsi_entry(rsi: &[Option<f64>], rsi_ma: &[Option<f64>], p: &RsiParams) -> Reading<String> {
    let value = latest(rsi, p.period + 1)?;
    let ma = latest(rsi_ma, p.period + p.ma_period)?;
    Ok(format!("{value:.2} (MA: {ma:.2})"))
}

fn stoch_rsi_entry(stoch: &StochRsi, p: &RsiParams) -> Reading<String> {
    let stoch_window = p.stoch_period + p.stoch_k + p.stoch_d;
    let required = (p.period + 1).max(stoch_window.saturating_sub(1));
    let k = latest(&stoch.k, required)?;
    let d = latest(&stoch.d, required)?;
    Ok(format!("{k:.2} / {d:.2}"))
}

fn macd_entry(macd: &Macd, p: &MacdParams) -> Reading<String> {
    let line = latest(&macd.line, p.slow)?;
    let signal = latest(&macd.signal, p.slow)?;
    let hist = latest(&macd.histogram, p.slow)?;
    Ok(format!(
        "Line: {line:.2} | Signal: {signal:.2} | Histogram: {hist:.2}"
    ))
}

/// OBV and its average; a series without any volume has no OBV.
fn obv_entry(series: &PriceSeries, ma_period: usize) -> Reading<String> {
    let obv = calculate_obv(series.bars());
    let obv_ma = sma(&obv, ma_period);
    let value = latest(&obv, ma_period)?;
    let ma = latest(&obv_ma, ma_period)?;
    if !series.has_volume() {
        return Err(IndicatorValue::Undefined);
    }
    Ok(format!("{value:.0} (MA: {ma:.0})"))
}

fn dmi_entry(dmi: &Dmi, period: usize) -> Reading<String> {
    let adx = latest(&dmi.adx, 2 * period)?;
    let plus = latest(&dmi.plus_di, 2 * period)?;
    let minus = latest(&dmi.minus_di, 2 * period)?;
    Ok(format!("{adx:.2} (+DI: {plus:.2} | -DI: {minus:.2})"))
}

fn bollinger_entry(bb: &BollingerBands, period: usize) -> Reading<String> {
    let upper = latest(&bb.upper, period)?;
    let middle = latest(&bb.middle, period)?;
    let lower = latest(&bb.lower, period)?;
    Ok(format!(
        "Upper: {upper:.2} | Middle: {middle:.2} | Lower: {lower:.2}"
    ))
}

fn tenkan_kijun_entry(ichi: &Ichimoku, p: &IchimokuParams) -> Reading<String> {
    let conversion = latest(&ichi.conversion, p.conversion)?;
    let base = latest(&ichi.base, p.base)?;
    Ok(format!("{conversion:.2} / {base:.2}"))
}

fn cloud_entry(ichi: &Ichimoku, p: &IchimokuParams) -> Reading<String> {
    let required = p.span_b.max(p.base) + p.displacement;
    let a = latest(&ichi.span_a, required)?;
    let b = latest(&ichi.span_b, required)?;
    Ok(CloudTrend::classify(a, b).to_string())
}

fn pivot_entry(bars: &[Bar]) -> Reading<String> {
    let p = enough(bars.len(), 2, classic_pivots(bars))?;
    Ok(format!(
        "P: {:.2} | R1: {:.2} | S1: {:.2} | R2: {:.2} | S2: {:.2} | R3: {:.2} | S3: {:.2}",
        p.pivot, p.r1, p.s1, p.r2, p.s2, p.r3, p.s3
    ))
}

fn alphatrend_entry(values: &[Option<f64>], p: &AlphaTrendParams) -> Reading<String> {
    let n = values.len();
    let value = latest(values, p.period + 1)?;
    let direction = enough(
        n,
        p.period + 4,
        alphatrend_direction(values, n.saturating_sub(1)),
    )?;
    let label = match direction {
        TrendDirection::Up => "Bullish",
        TrendDirection::Down => "Bearish",
    };
    Ok(format!("{value:.2} | {label}"))
}

fn alphatrend_signal_entry(values: &[Option<f64>], p: &AlphaTrendParams) -> Reading<String> {
    let n = values.len();
    // The crossover compares the last four values.
    let recent = values
        .get(n.saturating_sub(4)..)
        .filter(|w| w.len() == 4 && w.iter().all(Option::is_some));
    enough(n, p.period + 4, recent)?;
    Ok(signal_text(alphatrend_signal(values, n.saturating_sub(1))))
}

fn supertrend_entry(states: &[Option<SupertrendState>], p: &SupertrendParams) -> Reading<String> {
    let last = states.last().copied().flatten();
    let last = enough(states.len(), p.atr_period, last)?;
    Ok(format!("{:.2} | {}", last.value, last.direction))
}

fn supertrend_signal_entry(
    states: &[Option<SupertrendState>],
    p: &SupertrendParams,
) -> Reading<String> {
    let last = states.last().copied().flatten();
    enough(states.len(), p.atr_period + 1, last)?;
    Ok(signal_text(supertrend_signal(states)))
}

fn divergence_entry(rsi: &[Option<f64>], bars: &[Bar], p: &DivergenceParams) -> Reading<String> {
    enough(bars.len(), p.left + p.right + 1, Some(()))?;
    Ok(match detect_divergence(rsi, bars, p) {
        Some(d) => d.to_string(),
        None => NO_SIGNAL.to_string(),
    })
}

// =============================================================================
// Entry point
// =============================================================================

/// Validate `bars` and analyse them.
pub fn analyze_bars(
    bars: Vec<Bar>,
    config: &EngineConfig,
) -> Result<IndicatorReport, EngineError> {
    let series = PriceSeries::new(bars)?;
    analyze(&series, config)
}

/// Compute the full indicator report for one instrument.
pub fn analyze(
    series: &PriceSeries,
    config: &EngineConfig,
) -> Result<IndicatorReport, EngineError> {
    if series.len() < config.min_bars.max(1) {
        debug!(
            bars = series.len(),
            required = config.min_bars,
            "technical analysis: insufficient data"
        );
        return Err(EngineError::InsufficientData {
            required: config.min_bars,
            actual: series.len(),
        });
    }

    let bars = series.bars();
    let n = bars.len();
    let closes = series.closes();
    let w = &config.windows;
    let mut report = IndicatorReport::new();

    // --- Price ---------------------------------------------------------------
    report.insert(
        "Current Price",
        number(closes.last().copied().ok_or(IndicatorValue::Undefined)),
    );

    // --- Oscillators ---------------------------------------------------------
    let rsi_p = &config.rsi;
    let rsi = calculate_rsi(&closes, rsi_p.period);
    let rsi_ma = sma(&rsi, rsi_p.ma_period);
    report.insert(
        format!("RSI ({})", rsi_p.period),
        text(rsi_entry(&rsi, &rsi_ma, rsi_p)),
    );

    let stoch = calculate_stoch_rsi(&rsi, rsi_p.stoch_period, rsi_p.stoch_k, rsi_p.stoch_d);
    report.insert("Stoch RSI (K / D)", text(stoch_rsi_entry(&stoch, rsi_p)));

    let smi_p = &config.smi;
    report.insert(
        format!("SMI ({},{})", smi_p.period, smi_p.smoothing),
        number(latest(
            &calculate_smi(bars, smi_p.period, smi_p.smoothing),
            smi_p.period,
        )),
    );

    let macd_p = &config.macd;
    let macd = calculate_macd(&closes, macd_p.fast, macd_p.slow, macd_p.signal);
    report.insert(
        format!("MACD ({},{},{})", macd_p.fast, macd_p.slow, macd_p.signal),
        text(macd_entry(&macd, macd_p)),
    );

    report.insert("OBV", text(obv_entry(series, w.obv_ma)));

    report.insert(
        format!("CCI ({})", w.cci),
        number(latest(&calculate_cci(bars, w.cci), w.cci)),
    );

    // --- Volatility ----------------------------------------------------------
    report.insert(
        format!("ATR ({})", w.atr),
        number(latest(&calculate_atr(bars, w.atr), w.atr + 1)),
    );

    let dmi = calculate_dmi(bars, w.adx);
    report.insert(format!("ADX ({})", w.adx), text(dmi_entry(&dmi, w.adx)));

    // --- Volume --------------------------------------------------------------
    report.insert(
        format!("CMF ({})", w.cmf),
        number(latest(&calculate_cmf(bars, w.cmf), w.cmf)),
    );
    report.insert(
        format!("MFI ({})", w.mfi),
        number(latest(&calculate_mfi(bars, w.mfi), w.mfi + 1)),
    );

    // --- Bands ---------------------------------------------------------------
    let bb_p = &config.bollinger;
    let bb = calculate_bollinger(&closes, bb_p.period, bb_p.num_std);
    report.insert(
        format!("Bollinger Bands ({},{})", bb_p.period, bb_p.num_std),
        text(bollinger_entry(&bb, bb_p.period)),
    );
    report.insert("BB Width (%)", number(latest(&bb.width, bb_p.period)));
    report.insert("BB %B", number(latest(&bb.percent_b, bb_p.period)));

    // --- Ichimoku ------------------------------------------------------------
    let ichi_p = &config.ichimoku;
    let ichi = calculate_ichimoku(bars, ichi_p);
    report.insert(
        "Ichimoku (Tenkan / Kijun)",
        text(tenkan_kijun_entry(&ichi, ichi_p)),
    );
    report.insert("Ichimoku Cloud", text(cloud_entry(&ichi, ichi_p)));

    // --- Momentum / relative volume / pivots ---------------------------------
    report.insert(
        format!("Momentum ({})", w.momentum),
        number(latest(
            &calculate_momentum(&closes, w.momentum),
            w.momentum + 1,
        )),
    );
    report.insert(
        "Relative Volume (RVOL)",
        number(latest(
            &calculate_relative_volume(&series.volumes(), w.relative_volume),
            w.relative_volume + 1,
        )),
    );
    report.insert("Pivot (Classic)", text(pivot_entry(bars)));

    // --- Trend-following recursions ------------------------------------------
    let st_p = &config.supertrend;
    let supertrend = calculate_supertrend(bars, st_p.atr_period, st_p.factor);
    report.insert(
        format!("Supertrend ({},{})", st_p.atr_period, st_p.factor),
        text(supertrend_entry(&supertrend, st_p)),
    );
    report.insert(
        "Supertrend Signal",
        text(supertrend_signal_entry(&supertrend, st_p)),
    );

    let at_p = &config.alphatrend;
    let alphatrend = calculate_alphatrend(bars, at_p.period, at_p.coeff);
    report.insert(
        format!("AlphaTrend ({},{})", at_p.coeff, at_p.period),
        text(alphatrend_entry(&alphatrend, at_p)),
    );
    report.insert(
        "AlphaTrend Signal",
        text(alphatrend_signal_entry(&alphatrend, at_p)),
    );

    // --- Divergence ----------------------------------------------------------
    report.insert(
        "RSI Divergence",
        text(divergence_entry(&rsi, bars, &config.divergence)),
    );

    // --- Moving-average bank -------------------------------------------------
    let bank = moving_average_bank(&closes, &config.ma_periods);
    let kinds: [(&str, fn(&MovingAverages) -> f64); 3] = [
        ("SMA", |m| m.sma),
        ("EMA", |m| m.ema),
        ("WMA", |m| m.wma),
    ];
    for (kind, pick) in kinds {
        for (period, ma) in &bank {
            let value = match ma {
                Some(m) => IndicatorValue::number(pick(m)),
                None => shortfall(n, *period),
            };
            report.insert(format!("{kind} ({period})"), value);
        }
    }

    let unavailable = report.iter().filter(|(_, v)| !v.is_available()).count();
    for (label, value) in report.iter().filter(|(_, v)| !v.is_available()) {
        trace!(label, reason = %value, "indicator unavailable");
    }

    debug!(
        bars = n,
        has_volume = series.has_volume(),
        entries = report.len(),
        unavailable,
        "technical analysis complete"
    );

    Ok(report)
}
