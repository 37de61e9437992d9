//! Exchange-Native Guard (spec §6, §9 Design Notes "Dynamic dispatch &
//! runtime reflection"): validates source names through explicit allow/ban
//! lists and fixed structural predicates. No reflection — every envelope
//! carries a source string and it is checked at the boundary, once, here.

use crate::error::VenueError;
use cryptorun_types::VenueId;

/// Aggregator/composite sources banned from ever backing a microstructure
/// field (spec §6 "Banned sources (hard)").
const BANNED_SOURCES: &[&str] = &[
    "coingecko",
    "coinpaprika",
    "dexscreener",
    "defillama",
    "coinmarketcap",
    "cryptocompare",
    "messari",
    "nomics",
    "coinapi",
];

/// Substrings that mark a source as aggregated regardless of exact name.
const BANNED_SUBSTRINGS: &[&str] = &["aggregated", "composite", "blended", "averaged", "merged"];

/// Exchange-native sources this scanner speaks to directly.
const ALLOWED_SOURCES: &[&str] = &["binance", "okx", "coinbase", "kraken"];

fn normalize(source: &str) -> String {
    source.to_ascii_lowercase()
}

/// True if `source` is one of the four allowed exchange-native venues and
/// carries none of the banned substrings.
pub fn is_exchange_native(source: &str) -> bool {
    let normalized = normalize(source);
    if BANNED_SOURCES.iter().any(|b| normalized == *b) {
        return false;
    }
    if BANNED_SUBSTRINGS.iter().any(|b| normalized.contains(b)) {
        return false;
    }
    ALLOWED_SOURCES.iter().any(|a| normalized == *a)
}

/// Fails closed (scenario S6): any microstructure source that isn't
/// recognizably exchange-native is an `AggregatorViolation`, never passed
/// through silently.
pub fn assert_exchange_native(venue: VenueId, source: &str) -> Result<(), VenueError> {
    if is_exchange_native(source) {
        Ok(())
    } else {
        Err(VenueError::AggregatorViolation { venue, source: source.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_exact_exchange_names() {
        for s in ALLOWED_SOURCES {
            assert!(is_exchange_native(s));
        }
    }

    #[test]
    fn rejects_named_aggregators() {
        for s in BANNED_SOURCES {
            assert!(!is_exchange_native(s));
        }
    }

    #[test]
    fn scenario_s6_rejects_aggregated_book_label() {
        assert!(!is_exchange_native("aggregated_book"));
        assert_eq!(
            assert_exchange_native(VenueId::Binance, "aggregated_book"),
            Err(VenueError::AggregatorViolation { venue: VenueId::Binance, source: "aggregated_book".to_string() })
        );
    }

    #[test]
    fn rejects_unknown_source_by_default() {
        assert!(!is_exchange_native("some_random_feed"));
    }
}
