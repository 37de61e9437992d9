//! Venue and symbol identification.
//!
//! `VenueId` mirrors the teacher's bijective venue registry
//! (`protocol/identifiers/instrument/venues.rs`) scaled down to the four
//! exchange-native venues this scanner speaks to directly; aggregator
//! sources are never represented as a `VenueId` variant, only rejected at
//! the boundary (see `cryptorun-venues::source_guard`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VenueId {
    Binance,
    Okx,
    Coinbase,
    Kraken,
}

impl VenueId {
    pub const ALL: [VenueId; 4] = [VenueId::Binance, VenueId::Okx, VenueId::Coinbase, VenueId::Kraken];

    pub fn as_str(self) -> &'static str {
        match self {
            VenueId::Binance => "binance",
            VenueId::Okx => "okx",
            VenueId::Coinbase => "coinbase",
            VenueId::Kraken => "kraken",
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown venue: {0}")]
pub struct UnknownVenue(pub String);

impl FromStr for VenueId {
    type Err = UnknownVenue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binance" => Ok(VenueId::Binance),
            "okx" => Ok(VenueId::Okx),
            "coinbase" => Ok(VenueId::Coinbase),
            "kraken" => Ok(VenueId::Kraken),
            other => Err(UnknownVenue(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol must be BASE-QUOTE, got: {0}")]
    BadFormat(String),
    #[error("only USD-quoted pairs are supported, got quote: {0}")]
    NonUsdQuote(String),
}

/// A canonical `BASE-USD` trading pair, independent of any venue's native spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(base: &str, quote: &str) -> Result<Self, SymbolError> {
        if quote.to_ascii_uppercase() != "USD" {
            return Err(SymbolError::NonUsdQuote(quote.to_string()));
        }
        Ok(Symbol(format!("{}-USD", base.to_ascii_uppercase())))
    }

    pub fn parse(canonical: &str) -> Result<Self, SymbolError> {
        let mut parts = canonical.split('-');
        let (base, quote) = match (parts.next(), parts.next(), parts.next()) {
            (Some(b), Some(q), None) if !b.is_empty() && !q.is_empty() => (b, q),
            _ => return Err(SymbolError::BadFormat(canonical.to_string())),
        };
        Symbol::new(base, quote)
    }

    pub fn base(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_round_trips_through_str() {
        for v in VenueId::ALL {
            assert_eq!(VenueId::from_str(v.as_str()).unwrap(), v);
        }
    }

    #[test]
    fn symbol_rejects_non_usd_quote() {
        assert!(matches!(
            Symbol::new("BTC", "EUR"),
            Err(SymbolError::NonUsdQuote(_))
        ));
    }

    #[test]
    fn symbol_parses_canonical_form() {
        let s = Symbol::parse("BTC-USD").unwrap();
        assert_eq!(s.base(), "BTC");
        assert_eq!(s.as_str(), "BTC-USD");
    }

    #[test]
    fn symbol_rejects_malformed_input() {
        assert!(Symbol::parse("BTCUSD").is_err());
        assert!(Symbol::parse("BTC-USD-X").is_err());
    }
}
