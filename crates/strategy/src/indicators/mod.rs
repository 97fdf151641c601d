pub mod adx;
pub mod atr;
pub mod ema;
pub mod rsi;

pub use adx::adx_series;
pub use atr::{atr_series, true_range};
pub use ema::ema_series;
pub use rsi::rsi_series;

use common::Bar;

use crate::config::IndicatorPeriods;

/// Indicator values aligned with the bar slice they were computed from.
/// `None` marks an index without enough history for that indicator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

/// One bar together with its indicator values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorBar {
    pub bar: Bar,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
}

impl IndicatorBar {
    /// Every indicator has a value at this bar.
    pub fn is_complete(&self) -> bool {
        self.ema_fast.is_some()
            && self.ema_slow.is_some()
            && self.rsi.is_some()
            && self.atr.is_some()
            && self.adx.is_some()
    }
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }

    /// Pair bar `index` with its indicator values. `bars` must be the slice
    /// the series was computed from.
    pub fn at(&self, bars: &[Bar], index: usize) -> Option<IndicatorBar> {
        let bar = *bars.get(index)?;
        Some(IndicatorBar {
            bar,
            ema_fast: self.ema_fast.get(index).copied().flatten(),
            ema_slow: self.ema_slow.get(index).copied().flatten(),
            rsi: self.rsi.get(index).copied().flatten(),
            atr: self.atr.get(index).copied().flatten(),
            adx: self.adx.get(index).copied().flatten(),
        })
    }

    /// The last two bars as `(last, prev)`.
    pub fn last_two(&self, bars: &[Bar]) -> Option<(IndicatorBar, IndicatorBar)> {
        let n = bars.len().min(self.len());
        if n < 2 {
            return None;
        }
        Some((self.at(bars, n - 1)?, self.at(bars, n - 2)?))
    }
}

/// Compute every indicator over `bars` (oldest first). Pure.
pub fn compute(bars: &[Bar], periods: &IndicatorPeriods) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    IndicatorSeries {
        ema_fast: ema_series(&closes, periods.ema_fast),
        ema_slow: ema_series(&closes, periods.ema_slow),
        rsi: rsi_series(&closes, periods.rsi),
        atr: atr_series(bars, periods.atr),
        adx: adx_series(bars, periods.adx),
    }
}
