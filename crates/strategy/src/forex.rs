use common::{Bar, ForexSetup, OrderSide};

use crate::config::{ForexConfig, IndicatorPeriods};
use crate::indicators;

/// Two-stage forex check: direction from the trend timeframe, timing and
/// ATR-based levels from the entry timeframe.
#[derive(Debug, Clone, Default)]
pub struct ForexAnalyzer {
    pub periods: IndicatorPeriods,
    pub cfg: ForexConfig,
}

impl ForexAnalyzer {
    pub fn new(periods: IndicatorPeriods, cfg: ForexConfig) -> Self {
        Self { periods, cfg }
    }

    /// Trend direction of the last bar, or `None` when history is short,
    /// ADX is below `trend_adx_min`, or the EMAs are equal/undefined.
    pub fn trend(&self, bars: &[Bar]) -> Option<OrderSide> {
        if bars.len() < self.cfg.trend_min_bars.max(1) {
            return None;
        }
        let series = indicators::compute(bars, &self.periods);
        let last = series.at(bars, bars.len() - 1)?;

        let adx = last.adx?;
        let trending = adx >= self.cfg.trend_adx_min;
        if !trending {
            return None;
        }

        let (fast, slow) = (last.ema_fast?, last.ema_slow?);
        if fast > slow {
            Some(OrderSide::Buy)
        } else if fast < slow {
            Some(OrderSide::Sell)
        } else {
            None
        }
    }

    /// Entry on the last bar in the direction of `trend`, with stop and
    /// target placed `stop_atr_mult` / `target_atr_mult` ATRs away.
    pub fn entry(&self, bars: &[Bar], trend: OrderSide) -> Option<ForexSetup> {
        if bars.len() < self.cfg.entry_min_bars.max(1) {
            return None;
        }
        let series = indicators::compute(bars, &self.periods);
        let last = series.at(bars, bars.len() - 1)?;
        let (rsi, atr) = (last.rsi?, last.atr?);
        let price = last.bar.close;

        match trend {
            OrderSide::Buy
                if (self.cfg.buy_rsi_min..=self.cfg.buy_rsi_max).contains(&rsi)
                    && last.bar.is_bullish() =>
            {
                Some(ForexSetup {
                    side: OrderSide::Buy,
                    entry: price,
                    stop_loss: price - atr * self.cfg.stop_atr_mult,
                    take_profit: price + atr * self.cfg.target_atr_mult,
                })
            }
            OrderSide::Sell
                if (self.cfg.sell_rsi_min..=self.cfg.sell_rsi_max).contains(&rsi)
                    && last.bar.is_bearish() =>
            {
                Some(ForexSetup {
                    side: OrderSide::Sell,
                    entry: price,
                    stop_loss: price + atr * self.cfg.stop_atr_mult,
                    take_profit: price - atr * self.cfg.target_atr_mult,
                })
            }
            _ => None,
        }
    }
}
