//! Volume surge and VADR (volume-adjusted daily range).

use cryptorun_types::OhlcvBar;

/// Ratio of the most recent bar's volume to the rolling mean volume over
/// `bars` (excluding the most recent bar). `None` when fewer than 2 bars.
pub fn surge_vs_mean(bars: &[OhlcvBar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }
    let (history, last) = bars.split_at(bars.len() - 1);
    let mean = history.iter().map(|b| b.volume).sum::<f64>() / history.len() as f64;
    if mean <= 0.0 {
        return None;
    }
    Some(last[0].volume / mean)
}

/// Volume-adjusted daily range: the bar's (high-low)/close range,
/// multiplied by its volume surge relative to the rolling mean — a
/// liquidity-weighted range multiplier (spec glossary).
pub fn vadr(bars: &[OhlcvBar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }
    let last = bars.last()?;
    if last.close <= 0.0 {
        return None;
    }
    let range_pct = (last.high - last.low) / last.close;
    let surge = surge_vs_mean(bars)?;
    Some(range_pct * surge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(volume: f64) -> OhlcvBar {
        OhlcvBar { timestamp_ms: 1, open: 100.0, high: 102.0, low: 98.0, close: 100.0, volume }
    }

    #[test]
    fn surge_above_one_when_last_bar_exceeds_mean() {
        let bars = vec![bar(100.0), bar(100.0), bar(300.0)];
        let surge = surge_vs_mean(&bars).unwrap();
        assert!((surge - 3.0).abs() < 1e-9);
    }

    #[test]
    fn vadr_scales_range_by_surge() {
        let bars = vec![bar(100.0), bar(100.0), bar(200.0)];
        let v = vadr(&bars).unwrap();
        // range_pct = (102-98)/100 = 0.04, surge = 2.0
        assert!((v - 0.08).abs() < 1e-9);
    }
}
