//! OKX adapter, REST + WS, same `Guard`-wrapped shape as the Binance and
//! Coinbase adapters in this pack.

use crate::config::OkxAdapterConfig;
use crate::symbols;
use async_trait::async_trait;
use cryptorun_transport::{Guard, TransportError};
use cryptorun_types::{OhlcvBar, OrderBook, OrderBookLevel, Symbol, Timeframe, VenueId};
use cryptorun_venues::{Health, VenueAdapter, VenueError};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct BooksEnvelope {
    data: Vec<BooksData>,
}

#[derive(Debug, Deserialize)]
struct BooksData {
    asks: Vec<Vec<String>>,
    bids: Vec<Vec<String>>,
    ts: String,
}

#[derive(Debug, Deserialize)]
struct CandlesEnvelope {
    data: Vec<Vec<String>>,
}

fn level_from_row(row: &[String]) -> Option<OrderBookLevel> {
    Some(OrderBookLevel { price: row.first()?.parse().ok()?, size: row.get(1)?.parse().ok()? })
}

pub struct OkxAdapter {
    config: OkxAdapterConfig,
    client: reqwest::Client,
    guard: Arc<Guard>,
    requests: AtomicU64,
    errors: AtomicU64,
}

impl OkxAdapter {
    pub fn new(config: OkxAdapterConfig, guard: Arc<Guard>) -> Self {
        Self { config, client: reqwest::Client::new(), guard, requests: AtomicU64::new(0), errors: AtomicU64::new(0) }
    }

    fn bar_label(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::H1 => "1H",
            Timeframe::H4 => "4H",
            Timeframe::H12 => "12H",
            Timeframe::H24 => "1D",
            Timeframe::D7 => "1D",
        }
    }

    async fn fetch_order_book(&self, symbol: &Symbol) -> Result<OrderBook, VenueError> {
        let inst_id = symbols::to_native(symbol);
        self.requests.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .client
            .get(format!("{}/api/v5/market/books", self.config.rest_base_url))
            .query(&[("instId", inst_id.as_str()), ("sz", "50")])
            .send()
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Okx, endpoint: "books".to_string(), message: e.to_string() })?;

        let body: BooksEnvelope = resp.json().await.map_err(|e| {
            self.errors.fetch_add(1, Ordering::Relaxed);
            VenueError::Parse { venue: VenueId::Okx, endpoint: "books".to_string(), message: e.to_string() }
        })?;

        let snapshot = body.data.into_iter().next().ok_or_else(|| VenueError::Parse {
            venue: VenueId::Okx,
            endpoint: "books".to_string(),
            message: "empty order book response".to_string(),
        })?;

        Ok(OrderBook {
            symbol: symbol.clone(),
            venue: VenueId::Okx,
            timestamp_ms: snapshot.ts.parse().unwrap_or_else(|_| chrono::Utc::now().timestamp_millis()),
            sequence: 0,
            bids: snapshot.bids.iter().filter_map(|r| level_from_row(r)).collect(),
            asks: snapshot.asks.iter().filter_map(|r| level_from_row(r)).collect(),
        })
    }

    async fn fetch_klines(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> Result<Vec<OhlcvBar>, VenueError> {
        let inst_id = symbols::to_native(symbol);
        self.requests.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .client
            .get(format!("{}/api/v5/market/candles", self.config.rest_base_url))
            .query(&[("instId", inst_id.as_str()), ("bar", Self::bar_label(timeframe)), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Okx, endpoint: "candles".to_string(), message: e.to_string() })?;

        let body: CandlesEnvelope = resp.json().await.map_err(|e| {
            self.errors.fetch_add(1, Ordering::Relaxed);
            VenueError::Parse { venue: VenueId::Okx, endpoint: "candles".to_string(), message: e.to_string() }
        })?;

        let mut bars: Vec<OhlcvBar> = body
            .data
            .into_iter()
            .filter_map(|row| {
                Some(OhlcvBar {
                    timestamp_ms: row.first()?.parse().ok()?,
                    open: row.get(1)?.parse().ok()?,
                    high: row.get(2)?.parse().ok()?,
                    low: row.get(3)?.parse().ok()?,
                    close: row.get(4)?.parse().ok()?,
                    volume: row.get(5)?.parse().ok()?,
                })
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp_ms); // OKX returns newest-first
        Ok(bars)
    }
}

#[async_trait]
impl VenueAdapter for OkxAdapter {
    fn venue_id(&self) -> VenueId {
        VenueId::Okx
    }

    async fn get_order_book(&self, symbol: &Symbol, _depth: usize) -> Result<OrderBook, VenueError> {
        self.guard
            .execute(VenueId::Okx, || async { self.fetch_order_book(symbol).await.map_err(venue_to_transport) }, None)
            .await
            .map_err(|e| transport_to_venue(VenueId::Okx, "books", e))
    }

    async fn get_klines(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> Result<Vec<OhlcvBar>, VenueError> {
        self.guard
            .execute(
                VenueId::Okx,
                || async { self.fetch_klines(symbol, timeframe, limit).await.map_err(venue_to_transport) },
                None,
            )
            .await
            .map_err(|e| transport_to_venue(VenueId::Okx, "candles", e))
    }

    async fn subscribe(&self, symbols: &[Symbol], sink: Sender<OrderBook>) -> Result<(), VenueError> {
        let (mut ws, _) = connect_async(&self.config.websocket_url)
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Okx, endpoint: "ws".to_string(), message: e.to_string() })?;

        let args: Vec<_> = symbols
            .iter()
            .map(|s| serde_json::json!({"channel": "books", "instId": symbols::to_native(s)}))
            .collect();
        let subscribe_msg = serde_json::json!({"op": "subscribe", "args": args});
        ws.send(Message::Text(subscribe_msg.to_string()))
            .await
            .map_err(|e| VenueError::Transport { venue: VenueId::Okx, endpoint: "ws".to_string(), message: e.to_string() })?;

        while let Some(msg) = ws.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    warn!(venue = %VenueId::Okx, error = %e, "websocket read error");
                    break;
                }
            };
            let Message::Text(text) = msg else { continue };
            let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else { continue };
            let Some(inst_id) = value.pointer("/arg/instId").and_then(|v| v.as_str()) else { continue };
            let Ok(symbol) = symbols::from_native(inst_id) else { continue };
            let Some(entry) = value.get("data").and_then(|d| d.as_array()).and_then(|a| a.first()) else { continue };

            let bids = parse_levels(entry.get("bids"));
            let asks = parse_levels(entry.get("asks"));
            let ts = entry.get("ts").and_then(|v| v.as_str()).and_then(|s| s.parse().ok()).unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

            let book = OrderBook { symbol, venue: VenueId::Okx, timestamp_ms: ts, sequence: 0, bids, asks };
            debug!(venue = %VenueId::Okx, inst_id, "book update");
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

fn parse_levels(value: Option<&serde_json::Value>) -> Vec<OrderBookLevel> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_from_row_parses_price_and_size_ignoring_extra_fields() {
        // OKX book rows carry [price, size, liquidated_orders, order_count].
        let row = vec!["100.5".to_string(), "2.25".to_string(), "0".to_string(), "3".to_string()];
        let level = level_from_row(&row).unwrap();
        assert_eq!(level.price, 100.5);
        assert_eq!(level.size, 2.25);
    }

    #[test]
    fn books_envelope_deserializes_rest_shape() {
        let raw = r#"{"data":[{"asks":[["101.0","1.0"]],"bids":[["100.0","2.0"]],"ts":"1700000000000"}]}"#;
        let body: BooksEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].ts, "1700000000000");
    }

    #[test]
    fn candles_are_sorted_newest_first_to_chronological() {
        // OKX returns candles newest-first; fetch_klines re-sorts ascending.
        let mut bars = vec![
            OhlcvBar { timestamp_ms: 3_000, open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 1.0 },
            OhlcvBar { timestamp_ms: 1_000, open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 1.0 },
            OhlcvBar { timestamp_ms: 2_000, open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 1.0 },
        ];
        bars.sort_by_key(|b| b.timestamp_ms);
        assert_eq!(bars.iter().map(|b| b.timestamp_ms).collect::<Vec<_>>(), vec![1_000, 2_000, 3_000]);
    }

    #[test]
    fn bar_label_matches_okx_candle_intervals() {
        assert_eq!(OkxAdapter::bar_label(Timeframe::H1), "1H");
        assert_eq!(OkxAdapter::bar_label(Timeframe::H4), "4H");
    }
}
