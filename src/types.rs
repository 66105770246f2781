// =============================================================================
// Shared types used across the indicator engine
// =============================================================================
//
// `PriceSeries` is the validated input of one engine call; `IndicatorReport`
// is its output.  Neither carries state between calls.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::EngineError;

// =============================================================================
// Input
// =============================================================================

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Missing for most FX and commodity feeds; treated as zero.
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// Typical price `(high + low + close) / 3`.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Median price `(high + low) / 2`.
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    fn check(&self) -> Result<(), &'static str> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err("non-finite price");
        }
        if !self.volume.is_finite() {
            return Err("non-finite volume");
        }
        if self.volume < 0.0 {
            return Err("negative volume");
        }
        if self.high < self.low {
            return Err("high below low");
        }
        Ok(())
    }
}

/// Chronologically ordered, validated bar history of one instrument.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate `bars` and wrap them.
    ///
    /// Rejects an empty list, bars with non-finite or inconsistent fields and
    /// timestamps that are not strictly ascending.
    pub fn new(bars: Vec<Bar>) -> Result<Self, EngineError> {
        if bars.is_empty() {
            return Err(EngineError::EmptySeries);
        }

        for (index, bar) in bars.iter().enumerate() {
            bar.check()
                .map_err(|reason| EngineError::MalformedBar { index, reason })?;
        }

        if let Some(index) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(EngineError::UnorderedTimestamps { index: index + 1 });
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// `true` when at least one bar reports traded volume.
    pub fn has_volume(&self) -> bool {
        self.bars.iter().any(|b| b.volume > 0.0)
    }
}

// =============================================================================
// Output
// =============================================================================

/// One entry of an [`IndicatorReport`].
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    /// Rounded numeric reading.
    Number(f64),
    /// Composite reading with a fixed field order, or a textual label.
    Text(String),
    /// The series is shorter than the indicator's window.
    InsufficientHistory,
    /// The window is full but the arithmetic is degenerate (zero range,
    /// zero volume, zero variance).
    Undefined,
}

impl IndicatorValue {
    pub const INSUFFICIENT_HISTORY: &'static str = "insufficient history";
    pub const UNDEFINED: &'static str = "unavailable";

    /// Number rounded to two decimals.
    pub fn number(value: f64) -> Self {
        Self::Number(round2(value))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Text(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v:.2}"),
            Self::Text(s) => f.write_str(s),
            Self::InsufficientHistory => f.write_str(Self::INSUFFICIENT_HISTORY),
            Self::Undefined => f.write_str(Self::UNDEFINED),
        }
    }
}

impl Serialize for IndicatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::Text(s) => serializer.serialize_str(s),
            Self::InsufficientHistory => serializer.serialize_str(Self::INSUFFICIENT_HISTORY),
            Self::Undefined => serializer.serialize_str(Self::UNDEFINED),
        }
    }
}

/// Flat, ordered mapping of indicator label to value.
///
/// Labels are consumed verbatim by report formatting downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorReport {
    entries: Vec<(String, IndicatorValue)>,
}

impl IndicatorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, replacing any earlier entry with the same label.
    pub fn insert(&mut self, label: impl Into<String>, value: IndicatorValue) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&IndicatorValue> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndicatorValue)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for IndicatorReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(day: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn series_rejects_empty_input() {
        assert!(matches!(PriceSeries::new(vec![]), Err(EngineError::EmptySeries)));
    }

    #[test]
    fn series_rejects_nan_price() {
        let mut bars = vec![bar(0, 10.0), bar(1, 11.0)];
        bars[1].close = f64::NAN;
        assert!(matches!(
            PriceSeries::new(bars),
            Err(EngineError::MalformedBar { index: 1, .. })
        ));
    }

    #[test]
    fn series_rejects_inverted_range() {
        let mut bars = vec![bar(0, 10.0)];
        bars[0].high = 5.0;
        assert!(matches!(
            PriceSeries::new(bars),
            Err(EngineError::MalformedBar {
                index: 0,
                reason: "high below low"
            })
        ));
    }

    #[test]
    fn series_rejects_duplicate_timestamps() {
        let bars = vec![bar(0, 10.0), bar(1, 11.0), bar(1, 12.0)];
        assert!(matches!(
            PriceSeries::new(bars),
            Err(EngineError::UnorderedTimestamps { index: 2 })
        ));
    }

    #[test]
    fn series_accessors() {
        let series = PriceSeries::new(vec![bar(0, 10.0), bar(1, 11.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 11.0]);
        assert_eq!(series.volumes().len(), 2);
        assert!(series.has_volume());
    }

    #[test]
    fn bar_volume_defaults_to_zero() {
        let json =
            r#"{"timestamp":"2024-01-02T00:00:00Z","open":1,"high":2,"low":0.5,"close":1.5}"#;
        let b: Bar = serde_json::from_str(json).unwrap();
        assert_eq!(b.volume, 0.0);
    }

    #[test]
    fn value_display_uses_sentinels() {
        assert_eq!(IndicatorValue::number(1.23456).to_string(), "1.23");
        assert_eq!(
            IndicatorValue::InsufficientHistory.to_string(),
            "insufficient history"
        );
        assert_eq!(IndicatorValue::Undefined.to_string(), "unavailable");
    }

    #[test]
    fn report_serialises_as_ordered_map() {
        let mut report = IndicatorReport::new();
        report.insert("B", IndicatorValue::number(2.0));
        report.insert("A", IndicatorValue::InsufficientHistory);
        report.insert("B", IndicatorValue::Text("x".into()));
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"B":"x","A":"insufficient history"}"#);
        assert_eq!(report.len(), 2);
    }
}
