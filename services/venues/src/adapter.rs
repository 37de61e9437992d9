//! `VenueAdapter`: the capability surface every exchange-native venue
//! implementation exposes to the facade (spec §4.1, teacher's
//! `adapter_service::Adapter`/`SafeAdapter` split collapsed into one
//! object-safe trait since this scanner only needs one adapter per venue,
//! not a generic multi-protocol plugin host).

use crate::error::VenueError;
use crate::health::Health;
use async_trait::async_trait;
use cryptorun_types::{MultiTimeframeBars, OrderBook, Symbol, Timeframe, VenueId};

#[async_trait]
pub trait VenueAdapter: Send + Sync {
    fn venue_id(&self) -> VenueId;

    /// Live order book snapshot, REST fallback path.
    async fn get_order_book(&self, symbol: &Symbol, depth: usize) -> Result<OrderBook, VenueError>;

    /// Historical klines for one timeframe, enough bars for the factor engine's
    /// warm-up window.
    async fn get_klines(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> Result<Vec<cryptorun_types::OhlcvBar>, VenueError>;

    /// Subscribes to the venue's book/trade stream for `symbols`, pushing
    /// decoded order books onto `sink` until the adapter is dropped or the
    /// connection is cancelled. Returns once the stream ends (error or
    /// graceful shutdown), never blocks forever on a healthy connection.
    async fn subscribe(&self, symbols: &[Symbol], sink: tokio::sync::mpsc::Sender<OrderBook>) -> Result<(), VenueError>;

    /// Self-reported health used by the facade to pick primary vs. fallback.
    async fn health(&self) -> Health;
}

/// Convenience used by adapters that need all five timeframes at once.
#[async_trait]
pub trait MultiTimeframeSource: VenueAdapter {
    async fn get_multi_timeframe_bars(&self, symbol: &Symbol, limit_per_timeframe: usize) -> Result<MultiTimeframeBars, VenueError> {
        let mut bars = MultiTimeframeBars::default();
        for tf in Timeframe::ALL {
            let klines = self.get_klines(symbol, tf, limit_per_timeframe).await?;
            bars.insert(tf, klines);
        }
        Ok(bars)
    }
}

impl<T: VenueAdapter + ?Sized> MultiTimeframeSource for T {}
