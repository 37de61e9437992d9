//! Average True Range with Wilder smoothing over N=14 bars.

use cryptorun_types::OhlcvBar;

fn true_range(curr: &OhlcvBar, prev_close: f64) -> f64 {
    let hl = curr.high - curr.low;
    let hc = (curr.high - prev_close).abs();
    let lc = (curr.low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Wilder ATR over the last `period + 1` bars (needs one extra bar for the
/// seed close). `None` when insufficient history.
pub fn wilder_atr(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    if bars.len() < period + 1 {
        return None;
    }
    let start = bars.len() - (period + 1);
    let window = &bars[start..];

    let mut trs = Vec::with_capacity(period);
    for i in 1..window.len() {
        trs.push(true_range(&window[i], window[i - 1].close));
    }

    let mut atr = trs[..period].iter().sum::<f64>() / period as f64;
    for tr in &trs[period..] {
        atr = (atr * (period as f64 - 1.0) + tr) / period as f64;
    }
    Some(atr)
}
