use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceAdapterConfig {
    pub rest_base_url: String,
    pub websocket_base_url: String,
    pub max_retries: u32,
    pub connection_timeout_ms: u64,
}

impl Default for BinanceAdapterConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.binance.com".to_string(),
            websocket_base_url: "wss://stream.binance.com:9443/ws".to_string(),
            max_retries: 3,
            connection_timeout_ms: 5_000,
        }
    }
}
