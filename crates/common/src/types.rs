use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sampled price interval, as returned by the market data source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Start of the interval.
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Directional classification of the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Up,
    Down,
    #[default]
    None,
}

impl Signal {
    /// True for `Up` and `Down`.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::None)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Up => write!(f, "HIGHER ⬆️"),
            Signal::Down => write!(f, "LOWER ⬇️"),
            Signal::None => write!(f, "NONE"),
        }
    }
}

/// Side of a forex setup, decided by the higher-timeframe trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A forex entry with ATR-derived protective levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForexSetup {
    pub side: OrderSide,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl ForexSetup {
    /// Reward-to-risk ratio implied by the levels.
    pub fn reward_risk(&self) -> f64 {
        let risk = (self.entry - self.stop_loss).abs();
        if risk == 0.0 {
            return 0.0;
        }
        (self.take_profit - self.entry).abs() / risk
    }
}

/// Current phase of the scanner loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScannerState {
    #[default]
    Idle,
    Scanning,
}
