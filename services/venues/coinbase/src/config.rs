//! Configuration for the Coinbase adapter, shaped after the teacher's
//! `CoinbaseAdapterConfig` (base retry/timeout fields plus venue-specific
//! endpoints).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinbaseAdapterConfig {
    pub rest_base_url: String,
    pub websocket_url: String,
    pub max_retries: u32,
    pub connection_timeout_ms: u64,
    pub message_timeout_ms: u64,
}

impl Default for CoinbaseAdapterConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.exchange.coinbase.com".to_string(),
            websocket_url: "wss://ws-feed.exchange.coinbase.com".to_string(),
            max_retries: 3,
            connection_timeout_ms: 5_000,
            message_timeout_ms: 30_000,
        }
    }
}
