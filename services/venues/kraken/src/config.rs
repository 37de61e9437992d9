use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KrakenAdapterConfig {
    pub rest_base_url: String,
    pub websocket_url: String,
    pub max_retries: u32,
    pub connection_timeout_ms: u64,
}

impl Default for KrakenAdapterConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.kraken.com".to_string(),
            websocket_url: "wss://ws.kraken.com/v2".to_string(),
            max_retries: 3,
            connection_timeout_ms: 5_000,
        }
    }
}
