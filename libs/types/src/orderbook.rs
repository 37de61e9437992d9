//! Order book snapshot, spread, and depth calculations.
//!
//! Rounding rules (spec §3, Testable Properties 3 & 4, scenario S4) are
//! exact: `spread_bps` rounds HALF-UP, each depth leg rounds to the cent
//! before summation, and the final depth sum rounds to the nearest dollar.

use crate::venue::{Symbol, VenueId};
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: Symbol,
    pub venue: VenueId,
    pub timestamp_ms: i64,
    pub sequence: u64,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

fn to_decimal(x: f64) -> Decimal {
    Decimal::from_f64(x).unwrap_or(Decimal::ZERO)
}

fn round_half_up(d: Decimal, dp: u32) -> Decimal {
    d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<OrderBookLevel> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<OrderBookLevel> {
        self.asks.first().copied()
    }

    /// Invariant: `bid < ask`; all returned prices/sizes finite and positive.
    pub fn is_valid(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(b), Some(a)) => {
                b.price.is_finite()
                    && a.price.is_finite()
                    && b.price > 0.0
                    && a.price > 0.0
                    && b.size > 0.0
                    && a.size > 0.0
                    && b.price < a.price
            }
            _ => false,
        }
    }

    pub fn mid(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(b), Some(a)) => Some((b.price + a.price) / 2.0),
            _ => None,
        }
    }

    /// `spread_bps = RoundHalfUp((ask - bid) / mid * 10000)`.
    /// Non-positive mid or a missing side yields the sentinel `9999`.
    pub fn spread_bps(&self) -> i64 {
        let (bid, ask) = match (self.best_bid(), self.best_ask()) {
            (Some(b), Some(a)) => (b.price, a.price),
            _ => return 9999,
        };
        let mid = (bid + ask) / 2.0;
        if !(mid > 0.0) {
            return 9999;
        }
        let bps = (to_decimal(ask) - to_decimal(bid)) / to_decimal(mid) * Decimal::from(10_000);
        round_half_up(bps, 0).to_i64().unwrap_or(9999)
    }

    /// `depth_usd_pm2` sums `price * size` for every level within ±2% of
    /// mid, each leg rounded to the cent before the running sum, then the
    /// total rounded to the nearest dollar. Zero for empty books, books
    /// missing a mid, or levels with zero price/size. Order-independent.
    pub fn depth_usd_pm2(&self) -> i64 {
        let mid = match self.mid() {
            Some(m) if m > 0.0 => to_decimal(m),
            _ => return 0,
        };
        let lower = mid * Decimal::from_str("0.98").unwrap();
        let upper = mid * Decimal::from_str("1.02").unwrap();

        let mut total = Decimal::ZERO;
        for level in self.bids.iter().chain(self.asks.iter()) {
            if level.price <= 0.0 || level.size <= 0.0 {
                continue;
            }
            let price = to_decimal(level.price);
            if price < lower || price > upper {
                continue;
            }
            let size = to_decimal(level.size);
            let leg = round_half_up(price * size, 2);
            total += leg;
        }
        round_half_up(total, 0).to_i64().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(bids: Vec<(f64, f64)>, asks: Vec<(f64, f64)>) -> OrderBook {
        OrderBook {
            symbol: Symbol::parse("BTC-USD").unwrap(),
            venue: VenueId::Binance,
            timestamp_ms: 0,
            sequence: 1,
            bids: bids.into_iter().map(|(price, size)| OrderBookLevel { price, size }).collect(),
            asks: asks.into_iter().map(|(price, size)| OrderBookLevel { price, size }).collect(),
        }
    }

    #[test]
    fn spread_bps_sentinel_on_zero_mid() {
        let b = book(vec![(0.0, 1.0)], vec![(0.0, 1.0)]);
        assert_eq!(b.spread_bps(), 9999);
    }

    #[test]
    fn depth_matches_scenario_s4() {
        let b = book(
            vec![(99.0, 10.0), (98.5, 20.0), (98.0, 50.0)],
            vec![(101.0, 15.0), (101.5, 25.0), (102.0, 40.0)],
        );
        assert_eq!(b.mid(), Some(100.0));
        assert_eq!(b.depth_usd_pm2(), 15_993);
    }

    #[test]
    fn depth_is_order_independent() {
        let forward = book(
            vec![(99.0, 10.0), (98.5, 20.0), (98.0, 50.0)],
            vec![(101.0, 15.0), (101.5, 25.0), (102.0, 40.0)],
        );
        let reversed = book(
            vec![(98.0, 50.0), (98.5, 20.0), (99.0, 10.0)],
            vec![(102.0, 40.0), (101.5, 25.0), (101.0, 15.0)],
        );
        assert_eq!(forward.depth_usd_pm2(), reversed.depth_usd_pm2());
    }

    #[test]
    fn depth_zero_for_empty_or_degenerate_levels() {
        let empty = book(vec![], vec![]);
        assert_eq!(empty.depth_usd_pm2(), 0);

        let degenerate = book(vec![(0.0, 10.0), (99.0, 0.0)], vec![(0.0, 10.0), (101.0, 0.0)]);
        assert_eq!(degenerate.depth_usd_pm2(), 0);
    }

    #[test]
    fn is_valid_requires_bid_below_ask() {
        let bad = book(vec![(101.0, 1.0)], vec![(100.0, 1.0)]);
        assert!(!bad.is_valid());
        let good = book(vec![(99.0, 1.0)], vec![(101.0, 1.0)]);
        assert!(good.is_valid());
    }
}
