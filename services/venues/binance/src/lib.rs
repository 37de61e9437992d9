//! Binance spot venue adapter.

pub mod adapter;
pub mod config;
pub mod symbols;

pub use adapter::BinanceAdapter;
pub use config::BinanceAdapterConfig;
