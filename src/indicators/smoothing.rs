// =============================================================================
// Smoothing Primitives
// =============================================================================
//
// Every higher-level indicator is built from these series-in / series-out
// helpers.  A series is `Vec<Option<f64>>` aligned bar-for-bar with the input;
// `None` marks a bar where the value is not (yet) defined.
//
// Recursive averages (RMA / EMA) follow the charting-platform convention:
//
//   avg_0 = x_0                              (first defined sample)
//   avg_t = alpha * x_t + (1 - alpha) * avg_{t-1}
//
// with alpha = 1/length for Wilder's RMA and 2/(span+1) for the EMA.  There is
// no separate SMA seed window and no bias adjustment.  An undefined sample in
// the middle of a series carries the previous average forward.
//
// Rolling-window helpers require every sample of the window to be defined.
// =============================================================================

/// A bar-aligned indicator series.
pub type Series = Vec<Option<f64>>;

/// Wrap raw prices as a fully defined series.
pub fn lift(values: &[f64]) -> Series {
    values.iter().copied().map(Some).collect()
}

/// Wilder's moving average (alpha = 1/length).
pub fn rma(values: &[Option<f64>], length: usize) -> Series {
    if length == 0 {
        return vec![None; values.len()];
    }
    exponential(values, 1.0 / length as f64)
}

/// Exponential moving average by span (alpha = 2/(span+1)).
pub fn ema(values: &[Option<f64>], span: usize) -> Series {
    if span == 0 {
        return vec![None; values.len()];
    }
    exponential(values, 2.0 / (span as f64 + 1.0))
}

fn exponential(values: &[Option<f64>], alpha: f64) -> Series {
    let mut state: Option<f64> = None;
    values
        .iter()
        .map(|&x| {
            if let Some(x) = x {
                state = Some(match state {
                    None => x,
                    Some(prev) => alpha * x + (1.0 - alpha) * prev,
                });
            }
            state
        })
        .collect()
}

/// Apply `f` to each full window of `length` defined samples.
pub fn rolling<F>(values: &[Option<f64>], length: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if length == 0 || values.len() < length {
        return out;
    }

    let mut window = Vec::with_capacity(length);
    for i in (length - 1)..values.len() {
        window.clear();
        window.extend(values[i + 1 - length..=i].iter().map_while(|v| *v));
        if window.len() == length {
            out[i] = f(&window);
        }
    }
    out
}

/// Simple moving average.
pub fn sma(values: &[Option<f64>], length: usize) -> Series {
    let n = length as f64;
    rolling(values, length, |w| Some(w.iter().sum::<f64>() / n))
}

/// Linearly weighted moving average: weight `i + 1` for the `i`-th oldest
/// sample of the window.
pub fn wma(values: &[Option<f64>], length: usize) -> Series {
    let denom = (length * (length + 1)) as f64 / 2.0;
    rolling(values, length, |w| {
        let num: f64 = w.iter().enumerate().map(|(i, x)| (i + 1) as f64 * x).sum();
        Some(num / denom)
    })
}

pub fn rolling_sum(values: &[Option<f64>], length: usize) -> Series {
    rolling(values, length, |w| Some(w.iter().sum()))
}

pub fn rolling_max(values: &[Option<f64>], length: usize) -> Series {
    rolling(values, length, |w| w.iter().copied().reduce(f64::max))
}

pub fn rolling_min(values: &[Option<f64>], length: usize) -> Series {
    rolling(values, length, |w| w.iter().copied().reduce(f64::min))
}

/// Population standard deviation (denominator N).
pub fn rolling_std(values: &[Option<f64>], length: usize) -> Series {
    let n = length as f64;
    rolling(values, length, |w| {
        let mean = w.iter().sum::<f64>() / n;
        let var = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        Some(var.sqrt())
    })
}

/// Mean absolute deviation around the window mean.
pub fn rolling_mean_dev(values: &[Option<f64>], length: usize) -> Series {
    let n = length as f64;
    rolling(values, length, |w| {
        let mean = w.iter().sum::<f64>() / n;
        Some(w.iter().map(|x| (x - mean).abs()).sum::<f64>() / n)
    })
}

/// Lag a series by `n` bars (value at `i` is the input at `i - n`).
pub fn shift(values: &[Option<f64>], n: usize) -> Series {
    (0..values.len())
        .map(|i| i.checked_sub(n).and_then(|j| values[j]))
        .collect()
}

/// Bar-to-bar difference; the first bar is undefined.
pub fn diff(values: &[f64]) -> Series {
    std::iter::once(None)
        .chain(values.windows(2).map(|w| Some(w[1] - w[0])))
        .collect()
}

/// Combine two aligned series element-wise.
pub fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Series
where
    F: Fn(f64, f64) -> Option<f64>,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => f(*x, *y),
            _ => None,
        })
        .collect()
}

/// Division that refuses a zero denominator or a non-finite result.
pub fn safe_div(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let q = num / den;
    q.is_finite().then_some(q)
}
