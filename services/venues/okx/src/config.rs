use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkxAdapterConfig {
    pub rest_base_url: String,
    pub websocket_url: String,
    pub max_retries: u32,
    pub connection_timeout_ms: u64,
}

impl Default for OkxAdapterConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://www.okx.com".to_string(),
            websocket_url: "wss://ws.okx.com:8443/ws/v5/public".to_string(),
            max_retries: 3,
            connection_timeout_ms: 5_000,
        }
    }
}
