use common::{Bar, Signal};
use tracing::debug;

use crate::config::{BinaryConfig, IndicatorPeriods};
use crate::indicators::{self, IndicatorBar};

/// Classify the latest bar from the last two computed bars.
///
/// Pure and total: a missing indicator value on either bar, a weak trend
/// (ADX below `adx_min`) or a partial match of both rule sets yields
/// `Signal::None`.
pub fn classify(last: &IndicatorBar, prev: &IndicatorBar, cfg: &BinaryConfig) -> Signal {
    if !prev.is_complete() {
        return Signal::None;
    }
    let (Some(ema_fast), Some(ema_slow), Some(rsi), Some(atr), Some(adx), Some(prev_rsi)) =
        (last.ema_fast, last.ema_slow, last.rsi, last.atr, last.adx, prev.rsi)
    else {
        return Signal::None;
    };

    // Trend-strength gate; NaN never passes
    let trending = adx >= cfg.adx_min;
    if !trending {
        return Signal::None;
    }

    if let Some(k) = cfg.max_atr_distance {
        let near_trend = (last.bar.close - ema_fast).abs() < atr * k;
        if !near_trend {
            return Signal::None;
        }
    }

    if ema_fast > ema_slow
        && rsi > prev_rsi
        && (cfg.up_rsi_min..=cfg.up_rsi_max).contains(&rsi)
        && last.bar.is_bullish()
    {
        return Signal::Up;
    }

    if ema_fast < ema_slow
        && rsi < prev_rsi
        && (cfg.down_rsi_min..=cfg.down_rsi_max).contains(&rsi)
        && last.bar.is_bearish()
    {
        return Signal::Down;
    }

    Signal::None
}

/// Short-timeframe directional classifier over raw bars.
#[derive(Debug, Clone, Default)]
pub struct BinaryClassifier {
    pub periods: IndicatorPeriods,
    pub cfg: BinaryConfig,
}

impl BinaryClassifier {
    pub fn new(periods: IndicatorPeriods, cfg: BinaryConfig) -> Self {
        Self { periods, cfg }
    }

    /// Compute indicators over `bars` (oldest first) and classify the last bar.
    /// Fewer than `min_bars` bars, or too few for every indicator to be
    /// defined on the last two bars, yields `Signal::None`.
    pub fn evaluate(&self, bars: &[Bar]) -> Signal {
        let needed = self.cfg.min_bars.max(self.periods.warmup() + 1);
        if bars.len() < needed {
            debug!(bars = bars.len(), needed, "Not enough bars to classify");
            return Signal::None;
        }
        let series = indicators::compute(bars, &self.periods);
        match series.last_two(bars) {
            Some((last, prev)) => classify(&last, &prev, &self.cfg),
            None => Signal::None,
        }
    }
}
