//! Binance spot adapter, structured like the Coinbase adapter: REST calls
//! wrapped in the transport `Guard`, a WebSocket depth stream decoded into
//! the canonical `OrderBook`.

use crate::config::BinanceAdapterConfig;
use crate::symbols;
use async_trait::async_trait;
use cryptorun_transport::{Guard, TransportError};
use cryptorun_types::{OhlcvBar, OrderBook, OrderBookLevel, Symbol, Timeframe, VenueId};
use cryptorun_venues::{Health, VenueAdapter, VenueError};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct DepthResponse {
    #[serde(rename = "lastUpdateId")]
    last_update_id: u64,
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

fn level_from_pair(pair: &[String; 2]) -> Option<OrderBookLevel> {
    Some(OrderBookLevel { price: pair[0].parse().ok()?, size: pair[1].parse().ok()? })
}

pub struct BinanceAdapter {
    config: BinanceAdapterConfig,
    client: reqwest::Client,
    guard: Arc<Guard>,
    requests: AtomicU64,
    errors: AtomicU64,
}

impl BinanceAdapter {
    pub fn new(config: BinanceAdapterConfig, guard: Arc<Guard>) -> Self {
        Self { config, client: reqwest::Client::new(), guard, requests: AtomicU64::new(0), errors: AtomicU64::new(0) }
    }

    fn interval_label(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::H12 => "12h",
            Timeframe::H24 => "1d",
            Timeframe::D7 => "1d",
        }
    }

    async fn fetch_order_book(&self, symbol: &Symbol) -> Result<OrderBook, VenueError> {
        let native = symbols::to_native(symbol);
        self.requests.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .client
            .get(format!("{}/api/v3/depth", self.config.rest_base_url))
            .query(&[("symbol", native.as_str()), ("limit", "100")])
            .send()
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Binance, endpoint: "depth".to_string(), message: e.to_string() })?;

        let body: DepthResponse = resp.json().await.map_err(|e| {
            self.errors.fetch_add(1, Ordering::Relaxed);
            VenueError::Parse { venue: VenueId::Binance, endpoint: "depth".to_string(), message: e.to_string() }
        })?;

        Ok(OrderBook {
            symbol: symbol.clone(),
            venue: VenueId::Binance,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            sequence: body.last_update_id,
            bids: body.bids.iter().filter_map(level_from_pair).collect(),
            asks: body.asks.iter().filter_map(level_from_pair).collect(),
        })
    }

    async fn fetch_klines(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> Result<Vec<OhlcvBar>, VenueError> {
        let native = symbols::to_native(symbol);
        self.requests.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .client
            .get(format!("{}/api/v3/klines", self.config.rest_base_url))
            .query(&[("symbol", native.as_str()), ("interval", Self::interval_label(timeframe)), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Binance, endpoint: "klines".to_string(), message: e.to_string() })?;

        let raw: Vec<Value> = resp.json().await.map_err(|e| {
            self.errors.fetch_add(1, Ordering::Relaxed);
            VenueError::Parse { venue: VenueId::Binance, endpoint: "klines".to_string(), message: e.to_string() }
        })?;

        let bars = raw
            .into_iter()
            .filter_map(|row| {
                let row = row.as_array()?;
                Some(OhlcvBar {
                    timestamp_ms: row.first()?.as_i64()?,
                    open: row.get(1)?.as_str()?.parse().ok()?,
                    high: row.get(2)?.as_str()?.parse().ok()?,
                    low: row.get(3)?.as_str()?.parse().ok()?,
                    close: row.get(4)?.as_str()?.parse().ok()?,
                    volume: row.get(5)?.as_str()?.parse().ok()?,
                })
            })
            .collect();
        Ok(bars)
    }
}

#[async_trait]
impl VenueAdapter for BinanceAdapter {
    fn venue_id(&self) -> VenueId {
        VenueId::Binance
    }

    async fn get_order_book(&self, symbol: &Symbol, _depth: usize) -> Result<OrderBook, VenueError> {
        self.guard
            .execute(VenueId::Binance, || async { self.fetch_order_book(symbol).await.map_err(venue_to_transport) }, None)
            .await
            .map_err(|e| transport_to_venue(VenueId::Binance, "depth", e))
    }

    async fn get_klines(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> Result<Vec<OhlcvBar>, VenueError> {
        self.guard
            .execute(
                VenueId::Binance,
                || async { self.fetch_klines(symbol, timeframe, limit).await.map_err(venue_to_transport) },
                None,
            )
            .await
            .map_err(|e| transport_to_venue(VenueId::Binance, "klines", e))
    }

    async fn subscribe(&self, symbols: &[Symbol], sink: Sender<OrderBook>) -> Result<(), VenueError> {
        let Some(first) = symbols.first() else { return Ok(()) };
        let stream_name = format!("{}@depth20@100ms", symbols::to_native(first).to_ascii_lowercase());
        let url = format!("{}/{}", self.config.websocket_base_url, stream_name);

        let (mut ws, _) = connect_async(&url)
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Binance, endpoint: "ws".to_string(), message: e.to_string() })?;

        while let Some(msg) = ws.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    warn!(venue = %VenueId::Binance, error = %e, "websocket read error");
                    break;
                }
            };
            let Message::Text(text) = msg else { continue };
            let Ok(value) = serde_json::from_str::<Value>(&text) else { continue };

            let bids = parse_levels(value.get("bids"));
            let asks = parse_levels(value.get("asks"));
            if bids.is_empty() && asks.is_empty() {
                continue;
            }
            let book = OrderBook {
                symbol: first.clone(),
                venue: VenueId::Binance,
                timestamp_ms: chrono::Utc::now().timestamp_millis(),
                sequence: value.get("lastUpdateId").and_then(|v| v.as_u64()).unwrap_or(0),
                bids,
                asks,
            };
            debug!(venue = %VenueId::Binance, "depth update");
            if sink.send(book).await.is_err() {
                break;
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
            let level = level.as_array()?;
            let price: f64 = level.first()?.as_str()?.parse().ok()?;
            let size: f64 = level.get(1)?.as_str()?.parse().ok()?;
            Some(OrderBookLevel { price, size })
        })
        .collect()
}
