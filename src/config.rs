// =============================================================================
// Engine Configuration — indicator parameters with atomic save
// =============================================================================
//
// Every period, factor and threshold used by the engine lives here.  All
// fields carry `#[serde(default)]` so that `{}` yields the reference parameter
// set and adding new fields never breaks loading an older file.
//
// Persistence uses an atomic tmp + rename pattern.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_min_bars() -> usize {
    60
}

fn default_ma_periods() -> Vec<usize> {
    vec![5, 8, 13, 20, 21, 34, 50, 55, 89, 100, 144, 233, 377, 610]
}

// =============================================================================
// Parameter groups
// =============================================================================

/// RSI and the oscillators derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub period: usize,
    /// Simple average of RSI reported alongside it.
    pub ma_period: usize,
    /// Rolling min/max window of the stochastic transform.
    pub stoch_period: usize,
    pub stoch_k: usize,
    pub stoch_d: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            ma_period: 14,
            stoch_period: 14,
            stoch_k: 3,
            stoch_d: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmiParams {
    /// High/low range window.
    pub period: usize,
    /// Span of both exponential smoothing passes.
    pub smoothing: usize,
}

impl Default for SmiParams {
    fn default() -> Self {
        Self {
            period: 10,
            smoothing: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub num_std: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            num_std: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupertrendParams {
    pub atr_period: usize,
    pub factor: f64,
}

impl Default for SupertrendParams {
    fn default() -> Self {
        Self {
            atr_period: 10,
            factor: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaTrendParams {
    /// Window of both the simple-average ATR and the MFI gate.
    pub period: usize,
    pub coeff: f64,
}

impl Default for AlphaTrendParams {
    fn default() -> Self {
        Self {
            period: 14,
            coeff: 1.0,
        }
    }
}

/// RSI pivot divergence scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivergenceParams {
    /// Bars left of a pivot.
    pub left: usize,
    /// Bars right of a pivot; also the confirmation lag.
    pub right: usize,
    /// Closest earlier pivot considered, in bars.
    pub range_lower: usize,
    /// Farthest earlier pivot considered, in bars.
    pub range_upper: usize,
}

impl Default for DivergenceParams {
    fn default() -> Self {
        Self {
            left: 5,
            right: 5,
            range_lower: 5,
            range_upper: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    pub conversion: usize,
    pub base: usize,
    pub span_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            conversion: 9,
            base: 26,
            span_b: 52,
            displacement: 26,
        }
    }
}

/// Single-window indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    pub cci: usize,
    pub atr: usize,
    pub adx: usize,
    pub cmf: usize,
    pub mfi: usize,
    pub obv_ma: usize,
    pub momentum: usize,
    pub relative_volume: usize,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            cci: 20,
            atr: 14,
            adx: 14,
            cmf: 20,
            mfi: 14,
            obv_ma: 14,
            momentum: 10,
            relative_volume: 10,
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration of one engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Series shorter than this are rejected outright.
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,

    /// Periods of the SMA / EMA / WMA bank, in report order.
    #[serde(default = "default_ma_periods")]
    pub ma_periods: Vec<usize>,

    #[serde(default)]
    pub rsi: RsiParams,

    #[serde(default)]
    pub smi: SmiParams,

    #[serde(default)]
    pub macd: MacdParams,

    #[serde(default)]
    pub bollinger: BollingerParams,

    #[serde(default)]
    pub supertrend: SupertrendParams,

    #[serde(default)]
    pub alphatrend: AlphaTrendParams,

    #[serde(default)]
    pub divergence: DivergenceParams,

    #[serde(default)]
    pub ichimoku: IchimokuParams,

    #[serde(default)]
    pub windows: WindowParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_bars: default_min_bars(),
            ma_periods: default_ma_periods(),
            rsi: RsiParams::default(),
            smi: SmiParams::default(),
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
            supertrend: SupertrendParams::default(),
            alphatrend: AlphaTrendParams::default(),
            divergence: DivergenceParams::default(),
            ichimoku: IchimokuParams::default(),
            windows: WindowParams::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            min_bars = config.min_bars,
            ma_periods = ?config.ma_periods,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` (write `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }
}
