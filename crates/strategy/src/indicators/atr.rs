use common::Bar;

/// True range of `bar` against the previous close.
pub fn true_range(bar: &Bar, prev_close: f64) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

/// Average True Range with Wilder smoothing, one entry per bar.
///
/// The first true range needs a previous close, so the seed (mean of the
/// first `period` true ranges) lands on index `period`.
pub fn atr_series(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || bars.len() < period + 1 {
        return out;
    }

    let tr: Vec<f64> = bars
        .windows(2)
        .map(|w| true_range(&w[1], w[0].close))
        .collect();

    let mut atr = tr[..period].iter().sum::<f64>() / period as f64;
    out[period] = Some(atr);

    for (i, &range) in tr.iter().enumerate().skip(period) {
        atr = (atr * (period - 1) as f64 + range) / period as f64;
        out[i + 1] = Some(atr);
    }
    out
}
