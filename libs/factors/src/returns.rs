//! Log returns per timeframe and 4h acceleration (spec §4.5).

use cryptorun_types::OhlcvBar;

/// `r_t = ln(close_t / close_{t-1})` over the last two bars of `bars`.
/// `None` when fewer than two bars are available or a close is non-positive.
pub fn log_return(bars: &[OhlcvBar]) -> Option<f64> {
    let n = bars.len();
    if n < 2 {
        return None;
    }
    let prev = bars[n - 2].close;
    let curr = bars[n - 1].close;
    if prev <= 0.0 || curr <= 0.0 {
        return None;
    }
    Some((curr / prev).ln())
}

/// `a = r3 - 2*r2 + r1` over three consecutive 4h log returns, the last
/// three being the most recent. `bars` must be 4h bars; needs >= 4 bars to
/// derive three consecutive returns.
pub fn acceleration_4h(bars: &[OhlcvBar]) -> Option<f64> {
    let n = bars.len();
    if n < 4 {
        return None;
    }
    let r = |i: usize| -> Option<f64> {
        let prev = bars[i - 1].close;
        let curr = bars[i].close;
        if prev <= 0.0 || curr <= 0.0 {
            None
        } else {
            Some((curr / prev).ln())
        }
    };
    let r1 = r(n - 3)?;
    let r2 = r(n - 2)?;
    let r3 = r(n - 1)?;
    Some(r3 - 2.0 * r2 + r1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> OhlcvBar {
        OhlcvBar { timestamp_ms: 1, open: close, high: close, low: close, close, volume: 1.0 }
    }

    #[test]
    fn log_return_matches_manual_calculation() {
        let bars = vec![bar(100.0), bar(110.0)];
        let r = log_return(&bars).unwrap();
        assert!((r - (110.0f64 / 100.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn log_return_none_with_fewer_than_two_bars() {
        assert_eq!(log_return(&[bar(100.0)]), None);
    }

    #[test]
    fn acceleration_is_zero_for_linear_returns() {
        // equal log returns each step -> r3 - 2r2 + r1 == 0
        let bars = vec![bar(100.0), bar(110.0), bar(121.0), bar(133.1)];
        let a = acceleration_4h(&bars).unwrap();
        assert!(a.abs() < 1e-9);
    }
}
