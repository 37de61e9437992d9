//! Kraken's REST pair codes (`XBTUSD`) and WebSocket v2 symbols (`BTC/USD`)
//! disagree on both separator and Bitcoin's ticker (`XBT` vs `BTC`); both
//! native forms are exposed here rather than picking one and hoping.

use cryptorun_types::{Symbol, SymbolError};

fn to_kraken_base(base: &str) -> String {
    if base.eq_ignore_ascii_case("BTC") {
        "XBT".to_string()
    } else {
        base.to_string()
    }
}

fn from_kraken_base(base: &str) -> String {
    if base.eq_ignore_ascii_case("XBT") {
        "BTC".to_string()
    } else {
        base.to_string()
    }
}

pub fn to_rest_pair(symbol: &Symbol) -> String {
    format!("{}USD", to_kraken_base(symbol.base()))
}

pub fn from_rest_pair(pair: &str) -> Result<Symbol, SymbolError> {
    let upper = pair.to_ascii_uppercase();
    let base = upper.strip_suffix("USD").ok_or_else(|| SymbolError::NonUsdQuote(upper.clone()))?;
    Symbol::new(&from_kraken_base(base), "USD")
}

pub fn to_ws_symbol(symbol: &Symbol) -> String {
    format!("{}/USD", to_kraken_base(symbol.base()))
}

pub fn from_ws_symbol(native: &str) -> Result<Symbol, SymbolError> {
    let mut parts = native.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) if quote.eq_ignore_ascii_case("USD") => Symbol::new(&from_kraken_base(base), "USD"),
        _ => Err(SymbolError::BadFormat(native.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_pair_round_trips_with_xbt_substitution() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let native = to_rest_pair(&symbol);
        assert_eq!(native, "XBTUSD");
        assert_eq!(from_rest_pair(&native).unwrap(), symbol);
    }

    #[test]
    fn ws_symbol_round_trips_with_xbt_substitution() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let native = to_ws_symbol(&symbol);
        assert_eq!(native, "XBT/USD");
        assert_eq!(from_ws_symbol(&native).unwrap(), symbol);
    }

    #[test]
    fn non_btc_base_is_unchanged() {
        let symbol = Symbol::new("ETH", "USD").unwrap();
        assert_eq!(to_rest_pair(&symbol), "ETHUSD");
        assert_eq!(to_ws_symbol(&symbol), "ETH/USD");
    }
}
