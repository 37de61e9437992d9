//! Hurst exponent via rescaled-range (R/S) analysis over a configurable
//! window (default 50), clamped to [0, 1].

use cryptorun_types::OhlcvBar;

/// Computes the Hurst exponent over the last `period` closes' log returns.
/// `None` when fewer than `period + 1` bars are available.
pub fn hurst_exponent(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    if bars.len() < period + 1 {
        return None;
    }
    let start = bars.len() - (period + 1);
    let closes = &bars[start..];

    let returns: Vec<f64> = closes
        .windows(2)
        .map(|w| if w[0].close > 0.0 { (w[1].close / w[0].close).ln() } else { 0.0 })
        .collect();
    if returns.len() < 2 {
        return None;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let mut cumulative_deviation = 0.0;
    let mut max_dev = f64::MIN;
    let mut min_dev = f64::MAX;
    for r in &returns {
        cumulative_deviation += r - mean;
        max_dev = max_dev.max(cumulative_deviation);
        min_dev = min_dev.min(cumulative_deviation);
    }
    let range = max_dev - min_dev;

    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 || range == 0.0 {
        return Some(0.5); // no discernible trend or mean reversion
    }

    let rescaled_range = range / std_dev;
    let n = returns.len() as f64;
    let hurst = rescaled_range.ln() / n.ln();
    Some(hurst.clamp(0.0, 1.0))
}
