use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result};

/// Threshold file (TOML). Every field is optional; omitted values keep the
/// defaults below.
///
/// Example `config/strategy.toml`:
/// ```toml
/// [periods]
/// ema_fast = 50
/// ema_slow = 200
///
/// [binary]
/// adx_min = 20.0
/// up_rsi_min = 55.0
/// up_rsi_max = 70.0
/// max_atr_distance = 1.0
///
/// [forex]
/// enabled = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategyFileConfig {
    pub periods: IndicatorPeriods,
    pub binary: BinaryConfig,
    pub forex: ForexConfig,
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse strategy config at '{path}': {e}"))
        })?;
        info!(path, "Loaded strategy config");
        Ok(cfg)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Window sizes for every indicator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi: usize,
    pub atr: usize,
    pub adx: usize,
}

impl IndicatorPeriods {
    /// Bars needed before every indicator has a value at the last index.
    pub fn warmup(&self) -> usize {
        self.ema_fast
            .max(self.ema_slow)
            .max(self.rsi + 1)
            .max(self.atr + 1)
            .max(2 * self.adx)
    }
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            ema_fast: 50,
            ema_slow: 200,
            rsi: 14,
            atr: 14,
            adx: 14,
        }
    }
}

/// Thresholds for the short-timeframe directional classifier.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BinaryConfig {
    /// Provider bar interval, e.g. "1m".
    pub interval: String,
    /// Provider lookback range, e.g. "1d".
    pub range: String,
    /// Human label used in alerts.
    pub timeframe_label: String,
    /// Fewer fetched bars than this skip classification outright.
    pub min_bars: usize,
    /// Trend-strength gate: ADX below this never signals.
    pub adx_min: f64,
    pub up_rsi_min: f64,
    pub up_rsi_max: f64,
    pub down_rsi_min: f64,
    pub down_rsi_max: f64,
    /// Proximity filter: when set, require `|close - ema_fast| < atr * k`.
    pub max_atr_distance: Option<f64>,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            interval: "1m".into(),
            range: "1d".into(),
            timeframe_label: "1 Minute".into(),
            min_bars: 60,
            adx_min: 15.0,
            up_rsi_min: 52.0,
            up_rsi_max: 72.0,
            down_rsi_min: 28.0,
            down_rsi_max: 48.0,
            max_atr_distance: None,
        }
    }
}

/// Thresholds for the two-stage forex check (trend timeframe, then entry timeframe).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForexConfig {
    pub enabled: bool,

    pub trend_interval: String,
    pub trend_range: String,
    pub trend_min_bars: usize,
    pub trend_adx_min: f64,

    pub entry_interval: String,
    pub entry_range: String,
    pub entry_min_bars: usize,
    pub buy_rsi_min: f64,
    pub buy_rsi_max: f64,
    pub sell_rsi_min: f64,
    pub sell_rsi_max: f64,

    /// Stop distance in ATRs.
    pub stop_atr_mult: f64,
    /// Target distance in ATRs.
    pub target_atr_mult: f64,
}

impl Default for ForexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trend_interval: "15m".into(),
            trend_range: "5d".into(),
            trend_min_bars: 100,
            trend_adx_min: 20.0,
            entry_interval: "5m".into(),
            entry_range: "2d".into(),
            entry_min_bars: 50,
            buy_rsi_min: 40.0,
            buy_rsi_max: 55.0,
            sell_rsi_min: 45.0,
            sell_rsi_max: 60.0,
            stop_atr_mult: 1.5,
            target_atr_mult: 3.0,
        }
    }
}
