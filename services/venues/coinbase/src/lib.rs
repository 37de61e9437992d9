//! Coinbase Exchange venue adapter.

pub mod adapter;
pub mod config;
pub mod symbols;

pub use adapter::CoinbaseAdapter;
pub use config::CoinbaseAdapterConfig;
