//! OKX instrument IDs are `BASE-QUOTE` quoted in USDT (e.g. `BTC-USDT`);
//! the dash survives, only the quote leg needs translating to/from `USD`.

use cryptorun_types::{Symbol, SymbolError};

const NATIVE_QUOTE: &str = "USDT";

pub fn to_native(symbol: &Symbol) -> String {
    format!("{}-{}", symbol.base(), NATIVE_QUOTE)
}

pub fn from_native(inst_id: &str) -> Result<Symbol, SymbolError> {
    let mut parts = inst_id.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) if quote.eq_ignore_ascii_case(NATIVE_QUOTE) => Symbol::new(base, "USD"),
        _ => Err(SymbolError::BadFormat(inst_id.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_native_form() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let native = to_native(&symbol);
        assert_eq!(native, "BTC-USDT");
        assert_eq!(from_native(&native).unwrap(), symbol);
    }

    #[test]
    fn rejects_non_usdt_instrument() {
        assert!(from_native("BTC-EUR").is_err());
    }
}
