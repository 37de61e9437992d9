//! Kraken adapter. REST responses key their result map by Kraken's internal
//! pair name (not necessarily the one requested), so parsing takes the
//! first map entry rather than re-deriving the key.

use crate::config::KrakenAdapterConfig;
use crate::symbols;
use async_trait::async_trait;
use cryptorun_transport::{Guard, TransportError};
use cryptorun_types::{OhlcvBar, OrderBook, OrderBookLevel, Symbol, Timeframe, VenueId};
use cryptorun_venues::{Health, VenueAdapter, VenueError};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct DepthEnvelope {
    error: Vec<String>,
    result: std::collections::HashMap<String, DepthResult>,
}

#[derive(Debug, Deserialize)]
struct DepthResult {
    asks: Vec<Vec<Value>>,
    bids: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct OhlcEnvelope {
    error: Vec<String>,
    result: std::collections::HashMap<String, Value>,
}

fn level_from_row(row: &[Value]) -> Option<OrderBookLevel> {
    let price: f64 = row.first()?.as_str()?.parse().ok()?;
    let size: f64 = row.get(1)?.as_str()?.parse().ok()?;
    Some(OrderBookLevel { price, size })
}

pub struct KrakenAdapter {
    config: KrakenAdapterConfig,
    client: reqwest::Client,
    guard: Arc<Guard>,
    requests: AtomicU64,
    errors: AtomicU64,
}

impl KrakenAdapter {
    pub fn new(config: KrakenAdapterConfig, guard: Arc<Guard>) -> Self {
        Self { config, client: reqwest::Client::new(), guard, requests: AtomicU64::new(0), errors: AtomicU64::new(0) }
    }

    fn interval_minutes(timeframe: Timeframe) -> u32 {
        match timeframe {
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::H12 => 720,
            Timeframe::H24 => 1_440,
            Timeframe::D7 => 1_440,
        }
    }

    async fn fetch_order_book(&self, symbol: &Symbol) -> Result<OrderBook, VenueError> {
        let pair = symbols::to_rest_pair(symbol);
        self.requests.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .client
            .get(format!("{}/0/public/Depth", self.config.rest_base_url))
            .query(&[("pair", pair.as_str()), ("count", "100")])
            .send()
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Kraken, endpoint: "Depth".to_string(), message: e.to_string() })?;

        let body: DepthEnvelope = resp.json().await.map_err(|e| {
            self.errors.fetch_add(1, Ordering::Relaxed);
            VenueError::Parse { venue: VenueId::Kraken, endpoint: "Depth".to_string(), message: e.to_string() }
        })?;

        if let Some(msg) = body.error.first() {
            return Err(VenueError::Parse { venue: VenueId::Kraken, endpoint: "Depth".to_string(), message: msg.clone() });
        }
        let (_, result) = body.result.into_iter().next().ok_or_else(|| VenueError::Parse {
            venue: VenueId::Kraken,
            endpoint: "Depth".to_string(),
            message: "empty depth result".to_string(),
        })?;

        Ok(OrderBook {
            symbol: symbol.clone(),
            venue: VenueId::Kraken,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            sequence: 0,
            bids: result.bids.iter().filter_map(|r| level_from_row(r)).collect(),
            asks: result.asks.iter().filter_map(|r| level_from_row(r)).collect(),
        })
    }

    async fn fetch_klines(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> Result<Vec<OhlcvBar>, VenueError> {
        let pair = symbols::to_rest_pair(symbol);
        self.requests.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .client
            .get(format!("{}/0/public/OHLC", self.config.rest_base_url))
            .query(&[("pair", pair.as_str()), ("interval", &Self::interval_minutes(timeframe).to_string())])
            .send()
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Kraken, endpoint: "OHLC".to_string(), message: e.to_string() })?;

        let body: OhlcEnvelope = resp.json().await.map_err(|e| {
            self.errors.fetch_add(1, Ordering::Relaxed);
            VenueError::Parse { venue: VenueId::Kraken, endpoint: "OHLC".to_string(), message: e.to_string() }
        })?;

        if let Some(msg) = body.error.first() {
            return Err(VenueError::Parse { venue: VenueId::Kraken, endpoint: "OHLC".to_string(), message: msg.clone() });
        }
        let rows = body
            .result
            .into_iter()
            .find(|(key, _)| key != "last")
            .map(|(_, v)| v)
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();

        let bars = rows
            .into_iter()
            .filter_map(|row| {
                let row = row.as_array()?;
                Some(OhlcvBar {
                    timestamp_ms: row.first()?.as_i64()? * 1_000,
                    open: row.get(1)?.as_str()?.parse().ok()?,
                    high: row.get(2)?.as_str()?.parse().ok()?,
                    low: row.get(3)?.as_str()?.parse().ok()?,
                    close: row.get(4)?.as_str()?.parse().ok()?,
                    volume: row.get(6)?.as_str()?.parse().ok()?,
                })
            })
            .take(limit)
            .collect();
        Ok(bars)
    }
}

#[async_trait]
impl VenueAdapter for KrakenAdapter {
    fn venue_id(&self) -> VenueId {
        VenueId::Kraken
    }

    async fn get_order_book(&self, symbol: &Symbol, _depth: usize) -> Result<OrderBook, VenueError> {
        self.guard
            .execute(VenueId::Kraken, || async { self.fetch_order_book(symbol).await.map_err(venue_to_transport) }, None)
            .await
            .map_err(|e| transport_to_venue(VenueId::Kraken, "Depth", e))
    }

    async fn get_klines(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> Result<Vec<OhlcvBar>, VenueError> {
        self.guard
            .execute(
                VenueId::Kraken,
                || async { self.fetch_klines(symbol, timeframe, limit).await.map_err(venue_to_transport) },
                None,
            )
            .await
            .map_err(|e| transport_to_venue(VenueId::Kraken, "OHLC", e))
    }

    async fn subscribe(&self, symbols: &[Symbol], sink: Sender<OrderBook>) -> Result<(), VenueError> {
        let (mut ws, _) = connect_async(&self.config.websocket_url)
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Kraken, endpoint: "ws".to_string(), message: e.to_string() })?;

        let ws_symbols: Vec<String> = symbols.iter().map(symbols::to_ws_symbol).collect();
        let subscribe_msg = serde_json::json!({
            "method": "subscribe",
            "params": {"channel": "book", "symbol": ws_symbols},
        });
        ws.send(Message::Text(subscribe_msg.to_string()))
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Kraken, endpoint: "ws".to_string(), message: e.to_string() })?;

        while let Some(msg) = ws.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    warn!(venue = %VenueId::Kraken, error = %e, "websocket read error");
                    break;
                }
            };
            let Message::Text(text) = msg else { continue };
            let Ok(value) = serde_json::from_str::<Value>(&text) else { continue };
            if value.get("channel").and_then(|c| c.as_str()) != Some("book") {
                continue;
            }
            let Some(entries) = value.get("data").and_then(|d| d.as_array()) else { continue };
            for entry in entries {
                let Some(native_symbol) = entry.get("symbol").and_then(|s| s.as_str()) else { continue };
                let Ok(symbol) = symbols::from_ws_symbol(native_symbol) else { continue };
                let bids = parse_levels(entry.get("bids"));
                let asks = parse_levels(entry.get("asks"));
                let book = OrderBook {
                    symbol,
                    venue: VenueId::Kraken,
                    timestamp_ms: chrono::Utc::now().timestamp_millis(),
                    sequence: 0,
                    bids,
                    asks,
                };
                debug!(venue = %VenueId::Kraken, native_symbol, "book update");
                if sink.send(book).await.is_err() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    async fn health(&self) -> Health {
        let requests = self.requests.load(Ordering::Relaxed).max(1);
        let errors = self.errors.load(Ordering::Relaxed);
        Health::from_observations(errors as f64 / requests as f64, 0, true, true)
    }
}

fn venue_to_transport(err: VenueError) -> TransportError {
    TransportError::Upstream { venue: err.venue(), message: err.to_string() }
}

fn transport_to_venue(venue: VenueId, endpoint: &str, err: TransportError) -> VenueError {
    VenueError::Transport { venue, endpoint: endpoint.to_string(), message: err.to_string() }
}

fn parse_levels(value: Option<&Value>) -> Vec<OrderBookLevel> {
    let Some(arr) = value.and_then(|v| v.as_array()) else { return Vec::new() };
    arr.iter()
        .filter_map(|level| {
            let price = level.get("price")?.as_f64()?;
            let qty = level.get("qty")?.as_f64()?;
            Some(OrderBookLevel { price, size: qty })
        })
        .collect()
}
