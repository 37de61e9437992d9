//! ADX(14) via Wilder-smoothed +DM/-DM/TR, returning {adx, plus_di, minus_di}.

use cryptorun_types::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxResult {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

fn wilder_smooth(initial_sum: f64, values: &[f64], period: usize) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(values.len() + 1);
    let mut prev = initial_sum;
    smoothed.push(prev);
    for v in values {
        prev = prev - (prev / period as f64) + v;
        smoothed.push(prev);
    }
    smoothed
}

/// Needs at least `2 * period + 1` bars: `period` to seed the initial sums,
/// `period` more so the ADX itself (a smoothed DX series) has a seed.
pub fn adx(bars: &[OhlcvBar], period: usize) -> Option<AdxResult> {
    if bars.len() < 2 * period + 1 {
        return None;
    }

    let mut tr = Vec::with_capacity(bars.len() - 1);
    let mut plus_dm = Vec::with_capacity(bars.len() - 1);
    let mut minus_dm = Vec::with_capacity(bars.len() - 1);

    for i in 1..bars.len() {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;
        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });

        let hl = bars[i].high - bars[i].low;
        let hc = (bars[i].high - bars[i - 1].close).abs();
        let lc = (bars[i].low - bars[i - 1].close).abs();
        tr.push(hl.max(hc).max(lc));
    }

    let seed_tr: f64 = tr[..period].iter().sum();
    let seed_plus: f64 = plus_dm[..period].iter().sum();
    let seed_minus: f64 = minus_dm[..period].iter().sum();

    let smoothed_tr = wilder_smooth(seed_tr, &tr[period..], period);
    let smoothed_plus = wilder_smooth(seed_plus, &plus_dm[period..], period);
    let smoothed_minus = wilder_smooth(seed_minus, &minus_dm[period..], period);

    let mut dx_series = Vec::with_capacity(smoothed_tr.len());
    for i in 0..smoothed_tr.len() {
        if smoothed_tr[i] == 0.0 {
            dx_series.push(0.0);
            continue;
        }
        let plus_di = 100.0 * smoothed_plus[i] / smoothed_tr[i];
        let minus_di = 100.0 * smoothed_minus[i] / smoothed_tr[i];
        let di_sum = plus_di + minus_di;
        let dx = if di_sum == 0.0 { 0.0 } else { 100.0 * (plus_di - minus_di).abs() / di_sum };
        dx_series.push(dx);
    }

    if dx_series.len() < period {
        return None;
    }
    let adx = dx_series[dx_series.len() - period..].iter().sum::<f64>() / period as f64;

    let last_tr = *smoothed_tr.last()?;
    let last_plus = *smoothed_plus.last()?;
    let last_minus = *smoothed_minus.last()?;
    let (plus_di, minus_di) =
        if last_tr == 0.0 { (0.0, 0.0) } else { (100.0 * last_plus / last_tr, 100.0 * last_minus / last_tr) };

    Some(AdxResult { adx, plus_di, minus_di })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(h: f64, l: f64, c: f64) -> OhlcvBar {
        OhlcvBar { timestamp_ms: 1, open: c, high: h, low: l, close: c, volume: 1.0 }
    }

    #[test]
    fn none_with_insufficient_bars() {
        let bars = vec![bar(10.0, 9.0, 9.5); 10];
        assert_eq!(adx(&bars, 14), None);
    }

    #[test]
    fn strong_uptrend_gives_high_plus_di() {
        let bars: Vec<OhlcvBar> =
            (0..40).map(|i| bar(10.0 + i as f64, 9.0 + i as f64, 9.5 + i as f64)).collect();
        let result = adx(&bars, 14).unwrap();
        assert!(result.plus_di > result.minus_di);
    }
}
