// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of every indicator the engine
// reports.  Functions take bars or price slices and return bar-aligned
// `Series` (`Vec<Option<f64>>`) so callers are forced to handle warm-up and
// numerical-edge-case bars explicitly.
//
// Dependency order:
//   smoothing -> rsi / macd / smi / cci / atr / bollinger / volume
//             -> adx (atr), alphatrend (atr, volume, rsi), supertrend (atr),
//                divergence (rsi)
//   ichimoku / pivots / momentum / moving_averages are closed-form.

pub mod smoothing;

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod macd;
pub mod rsi;
pub mod smi;
pub mod volume;

pub mod alphatrend;
pub mod divergence;
pub mod supertrend;

pub mod ichimoku;
pub mod momentum;
pub mod moving_averages;
pub mod pivots;

pub use smoothing::Series;
