/// Exponential moving average, one entry per input value.
///
/// Seeded with the SMA of the first `period` values, so entries before index
/// `period - 1` are `None`. `k = 2 / (period + 1)`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);

    for (i, &price) in values.iter().enumerate().skip(period) {
        ema = price * k + ema * (1.0 - k);
        out[i] = Some(ema);
    }
    out
}
