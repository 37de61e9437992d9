//! The universal record: [`Envelope`].

use crate::bars::OhlcvBar;
use crate::orderbook::OrderBook;
use crate::venue::{Symbol, VenueId};
use serde::{Deserialize, Serialize};

/// Authority tier a payload was retrieved from. Total order `Hot > Warm > Cold`
/// (derived from discriminant order below).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceTier {
    Cold = 1,
    Warm = 2,
    Hot = 3,
}

impl SourceTier {
    pub fn authority(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub original_source: String,
    pub cache_hit: bool,
    pub fallback_chain: Vec<SourceTier>,
    pub retrieved_at_ms: i64,
    pub ttl_expires_ms: i64,
    pub latency_ms: u32,
    pub retry_count: u32,
    pub circuit_state: String,
    pub confidence: f64,
}

impl Provenance {
    pub fn fresh(original_source: impl Into<String>, retrieved_at_ms: i64, ttl_expires_ms: i64) -> Self {
        Self {
            original_source: original_source.into(),
            cache_hit: false,
            fallback_chain: Vec::new(),
            retrieved_at_ms,
            ttl_expires_ms,
            latency_ms: 0,
            retry_count: 0,
            circuit_state: "closed".to_string(),
            confidence: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingPayload {
    pub rate: f64,
    pub next_funding_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenInterestPayload {
    pub oi_usd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    OrderBook(OrderBook),
    Ohlcv(OhlcvBar),
    Funding(FundingPayload),
    OpenInterest(OpenInterestPayload),
}

/// The canonical record carrying payload plus provenance and checksum.
///
/// Invariants (spec §3, Testable Property 2 & envelope checksum property):
/// - `checksum` is stable for identical `(venue, symbol, timestamp, value, unit)`.
/// - `freshness_ms = now - timestamp_ms`, recomputed at handoff by the facade.
/// - `source_tier` authority order `Hot > Warm > Cold` is total.
/// - an envelope is stale iff `freshness_ms > use_case_budget_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub timestamp_ms: i64,
    pub venue: VenueId,
    pub symbol: Symbol,
    pub source_tier: SourceTier,
    pub freshness_ms: i64,
    pub provenance: Provenance,
    pub checksum: String,
    pub payload: Payload,
}

impl Envelope {
    pub fn is_stale(&self, use_case_budget_ms: i64) -> bool {
        self.freshness_ms > use_case_budget_ms
    }

    /// Recompute `freshness_ms` at handoff time, per the facade's contract.
    pub fn recompute_freshness(&mut self, now_ms: i64) {
        self.freshness_ms = now_ms - self.timestamp_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_order_is_total() {
        assert!(SourceTier::Hot > SourceTier::Warm);
        assert!(SourceTier::Warm > SourceTier::Cold);
    }

    #[test]
    fn stale_iff_freshness_exceeds_budget() {
        let env = Envelope {
            timestamp_ms: 0,
            venue: VenueId::Binance,
            symbol: Symbol::parse("BTC-USD").unwrap(),
            source_tier: SourceTier::Hot,
            freshness_ms: 5_001,
            provenance: Provenance::fresh("binance", 0, 5_000),
            checksum: String::new(),
            payload: Payload::Funding(FundingPayload { rate: 0.0, next_funding_ms: 0 }),
        };
        assert!(env.is_stale(5_000));
        assert!(!env.is_stale(5_001));
    }
}
