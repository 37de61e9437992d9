//! Technical Factor Engine: multi-timeframe log returns, 4h acceleration,
//! Wilder ATR/RSI, ADX, Hurst exponent, volume surge/VADR, and order-book
//! quality factors, assembled into a [`cryptorun_types::FactorRow`].

pub mod adx;
pub mod atr;
pub mod engine;
pub mod hurst;
pub mod returns;
pub mod rsi;
pub mod volume;

pub use adx::{adx as compute_adx, AdxResult};
pub use atr::wilder_atr;
pub use engine::{FactorEngine, FactorEngineConfig};
pub use hurst::hurst_exponent;
pub use returns::{acceleration_4h, log_return};
pub use rsi::wilder_rsi;
pub use volume::{surge_vs_mean, vadr};
