//! Kraken venue adapter.

pub mod adapter;
pub mod config;
pub mod symbols;

pub use adapter::KrakenAdapter;
pub use config::KrakenAdapterConfig;
