//! Terminal errors of an engine call.
//!
//! Per-indicator degradation is reported inside the
//! [`IndicatorReport`](crate::types::IndicatorReport); these errors mean no
//! indicator could be computed at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No bars were supplied.
    #[error("insufficient data: empty price series")]
    EmptySeries,

    /// Fewer bars than the configured minimum.
    #[error("insufficient data: need {required} bars, got {actual}")]
    InsufficientData {
        /// Minimum number of bars.
        required: usize,
        /// Bars supplied.
        actual: usize,
    },

    /// A bar failed OHLCV integrity checks.
    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar {
        /// Position of the offending bar.
        index: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Timestamps must be strictly ascending.
    #[error("bar at index {index} is not later than its predecessor")]
    UnorderedTimestamps {
        /// Position of the first out-of-order bar.
        index: usize,
    },
}
