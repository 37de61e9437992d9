//! Wilder RSI(14), seeded by the SMA of the first `period` gains/losses.

use cryptorun_types::OhlcvBar;

pub fn wilder_rsi(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    if bars.len() < period + 1 {
        return None;
    }
    let start = bars.len() - (period + 1);
    let window = &bars[start..];

    let mut gains = Vec::with_capacity(period);
    let mut losses = Vec::with_capacity(period);
    for i in 1..window.len() {
        let delta = window[i].close - window[i - 1].close;
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> OhlcvBar {
        OhlcvBar { timestamp_ms: 1, open: close, high: close, low: close, close, volume: 1.0 }
    }

    #[test]
    fn none_with_insufficient_bars() {
        let bars = vec![bar(100.0); 10];
        assert_eq!(wilder_rsi(&bars, 14), None);
    }

    #[test]
    fn all_gains_yields_rsi_of_100() {
        let bars: Vec<OhlcvBar> = (0..16).map(|i| bar(100.0 + i as f64)).collect();
        let rsi = wilder_rsi(&bars, 14).unwrap();
        assert_eq!(rsi, 100.0);
    }

    #[test]
    fn flat_series_yields_rsi_of_100_by_convention() {
        let bars = vec![bar(100.0); 16];
        let rsi = wilder_rsi(&bars, 14).unwrap();
        assert_eq!(rsi, 100.0);
    }
}
