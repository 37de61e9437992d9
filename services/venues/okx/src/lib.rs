//! OKX venue adapter.

pub mod adapter;
pub mod config;
pub mod symbols;

pub use adapter::OkxAdapter;
pub use config::OkxAdapterConfig;
