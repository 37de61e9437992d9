//! `FactorEngine`: builds a [`FactorRow`] from a symbol's multi-timeframe
//! bars and current order book. Generalizes the teacher's
//! `CompositeIndicator::update` streaming-update pattern into a batch
//! computation over already-accumulated bar history; each indicator keeps
//! the teacher's `is_ready()` validity-gating convention, here rolled up
//! into the row's single `valid` flag.

use crate::adx::adx;
use crate::atr::wilder_atr;
use crate::hurst::hurst_exponent;
use crate::returns::{acceleration_4h, log_return};
use crate::rsi::wilder_rsi;
use crate::volume::{surge_vs_mean, vadr};
use cryptorun_types::{FactorRow, MultiTimeframeBars, OrderBook, Symbol, Timeframe};

#[derive(Debug, Clone, Copy)]
pub struct FactorEngineConfig {
    pub atr_period: usize,
    pub rsi_period: usize,
    pub adx_period: usize,
    pub hurst_period: usize,
    pub min_bars_per_timeframe: usize,
}

impl Default for FactorEngineConfig {
    fn default() -> Self {
        Self { atr_period: 14, rsi_period: 14, adx_period: 14, hurst_period: 50, min_bars_per_timeframe: 2 }
    }
}

pub struct FactorEngine {
    config: FactorEngineConfig,
}

impl FactorEngine {
    pub fn new(config: FactorEngineConfig) -> Self {
        Self { config }
    }

    /// Builds a `FactorRow`. A missing minimum-bars timeframe or a failed
    /// indicator marks the row invalid rather than filling in a sentinel —
    /// an invalid row must never reach the composite scorer (spec §3).
    pub fn build_row(&self, symbol: Symbol, timestamp_ms: i64, bars: &MultiTimeframeBars, book: &OrderBook) -> FactorRow {
        let mut row = FactorRow::new(symbol, timestamp_ms);

        let min_bars = self.config.min_bars_per_timeframe;
        let mut momentum_valid = true;

        let returns_for = |tf: Timeframe| -> Option<f64> {
            bars.get(tf).filter(|b| b.len() >= min_bars).and_then(log_return)
        };

        row.momentum_core.r1h = returns_for(Timeframe::H1).unwrap_or_else(|| {
            momentum_valid = false;
            0.0
        });
        row.momentum_core.r4h = returns_for(Timeframe::H4).unwrap_or_else(|| {
            momentum_valid = false;
            0.0
        });
        row.momentum_core.r12h = returns_for(Timeframe::H12).unwrap_or_else(|| {
            momentum_valid = false;
            0.0
        });
        row.momentum_core.r24h = returns_for(Timeframe::H24).unwrap_or_else(|| {
            momentum_valid = false;
            0.0
        });
        row.momentum_core.r7d = returns_for(Timeframe::D7).unwrap_or_else(|| {
            momentum_valid = false;
            0.0
        });

        if let Some(h4_bars) = bars.get(Timeframe::H4) {
            if let Some(accel) = acceleration_4h(h4_bars) {
                row.momentum_core.accel_4h = accel;
            } else {
                momentum_valid = false;
            }
            if let Some(atr) = wilder_atr(h4_bars, self.config.atr_period) {
                row.momentum_core.atr_4h = atr;
            } else {
                momentum_valid = false;
            }
        } else {
            momentum_valid = false;
        }

        if let Some(h1_bars) = bars.get(Timeframe::H1) {
            if let Some(atr) = wilder_atr(h1_bars, self.config.atr_period) {
                row.momentum_core.atr_1h = atr;
            } else {
                momentum_valid = false;
            }
        } else {
            momentum_valid = false;
        }

        let mut technical_valid = true;
        if let Some(h4_bars) = bars.get(Timeframe::H4) {
            match wilder_rsi(h4_bars, self.config.rsi_period) {
                Some(rsi) => row.technical.rsi = rsi,
                None => technical_valid = false,
            }
            match adx(h4_bars, self.config.adx_period) {
                Some(result) => {
                    row.technical.adx = result.adx;
                    row.technical.plus_di = result.plus_di;
                    row.technical.minus_di = result.minus_di;
                }
                None => technical_valid = false,
            }
            match hurst_exponent(h4_bars, self.config.hurst_period) {
                Some(h) => row.technical.hurst = h,
                None => technical_valid = false,
            }
            if row.momentum_core.atr_4h > 0.0 {
                if let Some(last) = h4_bars.last() {
                    if last.close > 0.0 {
                        row.technical.atr_pct = row.momentum_core.atr_4h / last.close;
                    }
                }
            }
        } else {
            technical_valid = false;
        }

        let mut volume_valid = true;
        if let Some(h24_bars) = bars.get(Timeframe::H24) {
            match surge_vs_mean(h24_bars) {
                Some(s) => row.volume.surge_vs_mean = s,
                None => volume_valid = false,
            }
            match vadr(h24_bars) {
                Some(v) => row.volume.vadr = v,
                None => volume_valid = false,
            }
        } else {
            volume_valid = false;
        }

        row.quality.spread_bps = book.spread_bps() as f64;
        row.quality.depth_usd_pm2 = book.depth_usd_pm2() as f64;
        row.quality.book_imbalance = book_imbalance(book);

        row.valid = momentum_valid && technical_valid && volume_valid;
        row
    }
}

fn book_imbalance(book: &OrderBook) -> f64 {
    let bid_size: f64 = book.bids.iter().map(|l| l.size).sum();
    let ask_size: f64 = book.asks.iter().map(|l| l.size).sum();
    let total = bid_size + ask_size;
    if total <= 0.0 {
        0.0
    } else {
        (bid_size - ask_size) / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptorun_types::{OrderBookLevel, VenueId};

    fn ramp_bars(n: usize, start: f64) -> Vec<cryptorun_types::OhlcvBar> {
        (0..n)
            .map(|i| {
                let close = start + i as f64;
                cryptorun_types::OhlcvBar {
                    timestamp_ms: (i as i64) + 1,
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect()
    }

    fn book() -> OrderBook {
        OrderBook {
            symbol: Symbol::parse("BTC-USD").unwrap(),
            venue: VenueId::Binance,
            timestamp_ms: 1,
            sequence: 1,
            bids: vec![OrderBookLevel { price: 99.0, size: 10.0 }],
            asks: vec![OrderBookLevel { price: 101.0, size: 5.0 }],
        }
    }

    #[test]
    fn row_invalid_when_timeframe_missing() {
        let engine = FactorEngine::new(FactorEngineConfig::default());
        let bars = MultiTimeframeBars::new();
        let row = engine.build_row(Symbol::parse("BTC-USD").unwrap(), 1, &bars, &book());
        assert!(!row.valid);
    }

    #[test]
    fn row_valid_with_full_history() {
        let engine = FactorEngine::new(FactorEngineConfig::default());
        let mut bars = MultiTimeframeBars::new();
        bars.insert(Timeframe::H1, ramp_bars(30, 100.0));
        bars.insert(Timeframe::H4, ramp_bars(70, 100.0));
        bars.insert(Timeframe::H12, ramp_bars(30, 100.0));
        bars.insert(Timeframe::H24, ramp_bars(30, 100.0));
        bars.insert(Timeframe::D7, ramp_bars(30, 100.0));
        let row = engine.build_row(Symbol::parse("BTC-USD").unwrap(), 1, &bars, &book());
        assert!(row.valid);
        assert!(row.technical.rsi > 0.0);
    }

    #[test]
    fn book_imbalance_favors_heavier_side() {
        let imbalance = book_imbalance(&book());
        assert!(imbalance > 0.0); // more bid size than ask size
    }
}
