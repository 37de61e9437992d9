//! Coinbase product IDs are already `BASE-QUOTE` and need no base-coin
//! translation, unlike Binance/OKX/Kraken. Still routed through a dedicated
//! module so every venue crate exposes the same `to_native`/`from_native`
//! shape (spec §4.1 "Symbol Normalization").

use cryptorun_types::{Symbol, SymbolError};

pub fn to_native(symbol: &Symbol) -> String {
    symbol.as_str().to_string()
}

pub fn from_native(product_id: &str) -> Result<Symbol, SymbolError> {
    Symbol::parse(product_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_native_form() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let native = to_native(&symbol);
        assert_eq!(native, "BTC-USD");
        assert_eq!(from_native(&native).unwrap(), symbol);
    }

    #[test]
    fn rejects_non_usd_product() {
        assert!(from_native("BTC-EUR").is_err());
    }
}
