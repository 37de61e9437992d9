//! OHLCV bars across the five timeframes the factor engine consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    H1,
    H4,
    H12,
    H24,
    D7,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [Timeframe::H1, Timeframe::H4, Timeframe::H12, Timeframe::H24, Timeframe::D7];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::H12 => "12h",
            Timeframe::H24 => "24h",
            Timeframe::D7 => "7d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Invariants: `high >= max(open, close, low)`, `low <= min(open, close, high)`,
    /// `volume >= 0`, `timestamp_ms != 0`.
    pub fn is_valid(&self) -> bool {
        self.timestamp_ms != 0
            && self.volume >= 0.0
            && self.high >= self.open
            && self.high >= self.close
            && self.high >= self.low
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Ordered bars per timeframe. A timeframe with fewer than the configured
/// minimum bars is absent from scoring, not zero-filled (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiTimeframeBars {
    bars: BTreeMap<Timeframe, Vec<OhlcvBar>>,
}

impl MultiTimeframeBars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timeframe: Timeframe, bars: Vec<OhlcvBar>) {
        self.bars.insert(timeframe, bars);
    }

    pub fn get(&self, timeframe: Timeframe) -> Option<&[OhlcvBar]> {
        self.bars.get(&timeframe).map(|v| v.as_slice())
    }

    /// True when `timeframe` has at least `min_bars` valid, ordered bars.
    pub fn has_minimum(&self, timeframe: Timeframe, min_bars: usize) -> bool {
        self.get(timeframe)
            .map(|bars| bars.len() >= min_bars && bars.iter().all(OhlcvBar::is_valid))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, o: f64, h: f64, l: f64, c: f64, v: f64) -> OhlcvBar {
        OhlcvBar { timestamp_ms: ts, open: o, high: h, low: l, close: c, volume: v }
    }

    #[test]
    fn rejects_bar_with_inconsistent_high_low() {
        assert!(!bar(1, 10.0, 9.0, 8.0, 10.0, 1.0).is_valid());
        assert!(!bar(1, 10.0, 12.0, 11.0, 10.0, 1.0).is_valid());
        assert!(!bar(0, 10.0, 12.0, 9.0, 10.0, 1.0).is_valid());
        assert!(!bar(1, 10.0, 12.0, 9.0, 10.0, -1.0).is_valid());
    }

    #[test]
    fn minimum_bars_gate_is_strict() {
        let mut bars = MultiTimeframeBars::new();
        bars.insert(Timeframe::H1, vec![bar(1, 1.0, 1.0, 1.0, 1.0, 1.0); 5]);
        assert!(bars.has_minimum(Timeframe::H1, 5));
        assert!(!bars.has_minimum(Timeframe::H1, 6));
        assert!(!bars.has_minimum(Timeframe::H4, 1));
    }
}
