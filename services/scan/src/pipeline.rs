//! Per-symbol pipeline: order book through the tiered-cache facade, bars
//! straight from the venue (history isn't a single-value envelope), factor
//! row construction, then ADV for the gate cascade.

use crate::context::ScanContext;
use cryptorun_config::QualityPoliciesConfig;
use cryptorun_facade::cache::CacheKey;
use cryptorun_facade::DataFacade;
use cryptorun_factors::FactorEngine;
use cryptorun_types::{
    Envelope, FactorRow, MultiTimeframeBars, OrderBook, Payload, Provenance, SourceTier, Symbol, Timeframe, VenueId,
};
use cryptorun_validator::Validator;
use cryptorun_venues::{assert_exchange_native, MultiTimeframeSource, VenueAdapter};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("order book fetch failed for {symbol}: {source}")]
    Book { symbol: Symbol, #[source] source: cryptorun_facade::FacadeError },
    #[error("bars fetch failed for {symbol}: {source}")]
    Bars { symbol: Symbol, #[source] source: cryptorun_venues::VenueError },
    #[error("scan cancelled before {symbol} could be fetched")]
    Cancelled { symbol: Symbol },
    #[error("{symbol} rejected: {source}")]
    AggregatorRejected { symbol: Symbol, #[source] source: cryptorun_venues::VenueError },
}

/// Raw (pre-orthogonalization) per-symbol build: a `FactorRow` plus the ADV
/// figure the gate cascade needs but the factor engine doesn't compute.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub row: FactorRow,
    pub adv_usd: f64,
    pub move_24h_pct: f64,
    /// Whole 1h bars elapsed since the latest H1 close, the unit
    /// `FreshnessGuardConfig::max_bars_age` is expressed in.
    pub bars_age: u32,
}

const BOOK_FRESHNESS_BUDGET_MS: i64 = 5_000;
const BARS_PER_TIMEFRAME: usize = 120;

/// Fetches the order book (via the facade, so repeated symbols within one
/// scan's TTL window reuse the hot tier) and multi-timeframe bars (directly
/// from the venue; history isn't representable as a single envelope value),
/// then builds the raw factor row for one symbol.
pub async fn build_raw_row(
    facade: &DataFacade,
    adapter: &Arc<dyn VenueAdapter>,
    engine: &FactorEngine,
    validator: &Mutex<Validator>,
    quality: &QualityPoliciesConfig,
    venue: VenueId,
    symbol: &Symbol,
    now_ms: i64,
    ctx: &ScanContext,
) -> Result<RawRow, PipelineError> {
    if ctx.cancellation.is_cancelled() {
        return Err(PipelineError::Cancelled { symbol: symbol.clone() });
    }

    let book = fetch_book(facade, adapter, venue, symbol, now_ms).await?;

    let bars = adapter
        .get_multi_timeframe_bars(symbol, BARS_PER_TIMEFRAME)
        .await
        .map_err(|source| PipelineError::Bars { symbol: symbol.clone(), source })?;

    let mut row = engine.build_row(symbol.clone(), now_ms, &bars, &book);
    let adv_usd = average_daily_volume_usd(&bars);
    let move_24h_pct = move_pct(&bars, Timeframe::H24);
    let bars_age = bars_age_in_hours(&bars, now_ms);

    if let Some(breached) = quarantine_bar_quality(validator, quality, symbol, &bars) {
        warn!(symbol = %symbol, timeframe = breached.label(), "bad-miss-rate policy breached, row excluded from scoring");
        row.valid = false;
    }

    if !row.valid {
        warn!(symbol = %symbol, "factor row invalid, will be excluded from scoring");
    }

    Ok(RawRow { row, adv_usd, move_24h_pct, bars_age })
}

/// Runs every close in each timeframe's bar history through the rolling-window
/// validator and compares the resulting quarantine rate against the
/// timeframe's configured bad-miss-rate policy (spec §6 `quality_policies`).
/// Returns the first timeframe whose observed rate exceeds its threshold, if
/// any; that timeframe's data is too unreliable to score this symbol this
/// cycle.
fn quarantine_bar_quality(
    validator: &Mutex<Validator>,
    quality: &QualityPoliciesConfig,
    symbol: &Symbol,
    bars: &MultiTimeframeBars,
) -> Option<Timeframe> {
    let mut validator = validator.lock();
    for timeframe in Timeframe::ALL {
        let Some(closes) = bars.get(timeframe) else { continue };
        if closes.is_empty() {
            continue;
        }
        let field = format!("close_{}", timeframe.label());
        let quarantined =
            closes.iter().filter(|bar| validator.validate(symbol.as_str(), &field, bar.close).is_some()).count();
        let observed_rate = quarantined as f64 / closes.len() as f64;
        if quality.exceeds(timeframe, observed_rate) {
            return Some(timeframe);
        }
    }
    None
}

async fn fetch_book(
    facade: &DataFacade,
    adapter: &Arc<dyn VenueAdapter>,
    venue: VenueId,
    symbol: &Symbol,
    now_ms: i64,
) -> Result<OrderBook, PipelineError> {
    assert_exchange_native(venue, venue.as_str())
        .map_err(|source| PipelineError::AggregatorRejected { symbol: symbol.clone(), source })?;

    let key = CacheKey::new(venue, symbol.clone(), "order_book");
    let adapter = adapter.clone();
    let fetch_symbol = symbol.clone();
    let envelope = facade
        .fetch(key, BOOK_FRESHNESS_BUDGET_MS, now_ms, move || async move {
            let book = adapter.get_order_book(&fetch_symbol, 50).await.map_err(|e| {
                cryptorun_facade::FacadeError::FetchFailed { venue, symbol: fetch_symbol.clone(), message: e.to_string() }
            })?;
            let checksum = cryptorun_types::checksum::envelope_checksum(
                venue.as_str(),
                fetch_symbol.as_str(),
                book.timestamp_ms,
                &book.mid().map(|p| p.to_string()).unwrap_or_default(),
                "price",
            );
            Ok(Envelope {
                timestamp_ms: book.timestamp_ms,
                venue,
                symbol: fetch_symbol.clone(),
                source_tier: SourceTier::Hot,
                freshness_ms: now_ms - book.timestamp_ms,
                provenance: Provenance::fresh(venue.as_str(), now_ms, now_ms + BOOK_FRESHNESS_BUDGET_MS),
                checksum,
                payload: Payload::OrderBook(book),
            })
        })
        .await
        .map_err(|source| PipelineError::Book { symbol: symbol.clone(), source })?;

    match envelope.payload {
        Payload::OrderBook(book) => Ok(book),
        _ => unreachable!("order_book cache key always holds a Payload::OrderBook"),
    }
}

fn average_daily_volume_usd(bars: &MultiTimeframeBars) -> f64 {
    bars.get(Timeframe::H24).map(|bars| bars.iter().map(|b| b.volume * b.close).sum()).unwrap_or(0.0)
}

fn move_pct(bars: &MultiTimeframeBars, timeframe: Timeframe) -> f64 {
    match bars.get(timeframe) {
        Some(bars) if bars.len() >= 2 => {
            let first = bars.first().unwrap().close;
            let last = bars.last().unwrap().close;
            if first > 0.0 {
                (last - first) / first * 100.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

const HOUR_MS: i64 = 60 * 60 * 1_000;

fn bars_age_in_hours(bars: &MultiTimeframeBars, now_ms: i64) -> u32 {
    bars.get(Timeframe::H1)
        .and_then(|bars| bars.last())
        .map(|last| ((now_ms - last.timestamp_ms).max(0) / HOUR_MS) as u32)
        .unwrap_or(u32::MAX)
}
