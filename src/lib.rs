// =============================================================================
// ta-engine — technical indicator computation
// =============================================================================
//
// Pipeline, leaves first:
//   indicators::smoothing  -> oscillators / volatility / volume
//                          -> supertrend, alphatrend, divergence
//                          -> analysis (label -> value report)
// =============================================================================

pub mod analysis;
pub mod config;
pub mod error;
pub mod indicators;
pub mod types;

pub use analysis::{analyze, analyze_bars};
pub use config::EngineConfig;
pub use error::EngineError;
pub use types::{Bar, IndicatorReport, IndicatorValue, PriceSeries};
