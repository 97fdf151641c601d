// Average Directional Index (ADX)
//
// ADX quantifies trend strength regardless of direction:
//   1. +DM / -DM and True Range per bar.
//   2. Wilder running sums of each over `period` bars.
//   3. +DI = sum(+DM) / sum(TR) * 100, -DI likewise.
//   4. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   5. ADX = Wilder average of DX, seeded with the mean of the first `period` DX.

use common::Bar;

use super::atr::true_range;

/// ADX per bar. The first DX lands on index `period`, the first ADX on
/// `2 * period - 1`; earlier entries are `None`.
pub fn adx_series(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || bars.len() < 2 * period {
        return out;
    }

    let period_f = period as f64;
    let mut plus_dm = Vec::with_capacity(bars.len() - 1);
    let mut minus_dm = Vec::with_capacity(bars.len() - 1);
    let mut tr = Vec::with_capacity(bars.len() - 1);

    for w in bars.windows(2) {
        let (prev, cur) = (&w[0], &w[1]);
        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
        tr.push(true_range(cur, prev.close));
    }

    let mut smooth_plus: f64 = plus_dm[..period].iter().sum();
    let mut smooth_minus: f64 = minus_dm[..period].iter().sum();
    let mut smooth_tr: f64 = tr[..period].iter().sum();

    // dx[j] belongs to bar index period + j
    let mut dx = Vec::with_capacity(tr.len() - period + 1);
    dx.push(directional_index(smooth_plus, smooth_minus, smooth_tr));

    for i in period..tr.len() {
        smooth_plus = smooth_plus - smooth_plus / period_f + plus_dm[i];
        smooth_minus = smooth_minus - smooth_minus / period_f + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / period_f + tr[i];
        dx.push(directional_index(smooth_plus, smooth_minus, smooth_tr));
    }

    let mut adx = dx[..period].iter().sum::<f64>() / period_f;
    out[2 * period - 1] = Some(adx);

    for (j, &value) in dx.iter().enumerate().skip(period) {
        adx = (adx * (period_f - 1.0) + value) / period_f;
        out[period + j] = Some(adx);
    }
    out
}

/// DX from smoothed +DM, -DM and TR. Zero when there is no range or no
/// directional movement.
fn directional_index(plus_dm: f64, minus_dm: f64, tr: f64) -> f64 {
    if tr <= 0.0 {
        return 0.0;
    }
    let plus_di = plus_dm / tr * 100.0;
    let minus_di = minus_dm / tr * 100.0;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    (plus_di - minus_di).abs() / di_sum * 100.0
}
