//! Binance spot symbols are `BASEQUOTE` with no separator, quoted in USDT
//! rather than USD. This scanner treats USDT as the USD leg (spec §3
//! "usd-only pairs") so the canonical form drops the `USDT` suffix for `USD`.

use cryptorun_types::{Symbol, SymbolError};

const NATIVE_QUOTE: &str = "USDT";

pub fn to_native(symbol: &Symbol) -> String {
    format!("{}{}", symbol.base(), NATIVE_QUOTE)
}

pub fn from_native(native: &str) -> Result<Symbol, SymbolError> {
    let upper = native.to_ascii_uppercase();
    let base = upper
        .strip_suffix(NATIVE_QUOTE)
        .ok_or_else(|| SymbolError::NonUsdQuote(upper.clone()))?;
    Symbol::new(base, "USD")
}
