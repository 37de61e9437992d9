//! `DataFacade`: the single read path every downstream crate goes through.
//! Tries cache tiers in authority order, coalesces a live fetch through
//! `SingleFlight` on a miss or stale hit, and only fails `STALE` when
//! neither the cache nor a live fetch can satisfy the caller's freshness
//! budget.

use crate::cache::{CacheKey, Tier, TieredCache, TieredCacheConfig};
use crate::error::FacadeError;
use crate::single_flight::SingleFlight;
use cryptorun_types::{Envelope, SourceTier};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

pub struct DataFacade {
    cache: Arc<TieredCache>,
    single_flight: SingleFlight<CacheKey, Envelope, FacadeError>,
}

impl DataFacade {
    pub fn new(config: TieredCacheConfig) -> Self {
        Self { cache: TieredCache::new(config), single_flight: SingleFlight::new() }
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.cache
    }

    /// Returns the highest-authority envelope satisfying `use_case_budget_ms`,
    /// falling back to a coalesced live fetch on a cache miss or stale hit.
    pub async fn fetch<F, Fut>(
        &self,
        key: CacheKey,
        use_case_budget_ms: i64,
        now_ms: i64,
        fetcher: F,
    ) -> Result<Envelope, FacadeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Envelope, FacadeError>> + Send + 'static,
    {
        if let Some(envelope) = self.cache.get_satisfying(&key, use_case_budget_ms, now_ms).await {
            if !envelope.is_stale(use_case_budget_ms) {
                return Ok(envelope);
            }
            debug!(venue = %key.venue, symbol = %key.symbol, "no cached tier satisfies the budget, refetching");
        }

        let cache_for_write = self.cache.clone();
        let key_for_fetch = key.clone();
        let result = self
            .single_flight
            .run(key.clone(), move || async move {
                let mut envelope = fetcher().await?;
                envelope.provenance.fallback_chain.push(envelope.source_tier);
                envelope.source_tier = SourceTier::Hot;
                cache_for_write.put(Tier::Hot, key_for_fetch, envelope.clone()).await;
                Ok(envelope)
            })
            .await;

        match result {
            Ok(envelope) => Ok(envelope),
            Err(_) => Err(FacadeError::Stale { venue: key.venue, symbol: key.symbol }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptorun_types::{FundingPayload, Payload, Provenance, Symbol, VenueId};

    fn envelope_at(ts_ms: i64) -> Envelope {
        Envelope {
            timestamp_ms: ts_ms,
            venue: VenueId::Binance,
            symbol: Symbol::parse("BTC-USD").unwrap(),
            source_tier: SourceTier::Hot,
            freshness_ms: 0,
            provenance: Provenance::fresh("binance", ts_ms, ts_ms + 5_000),
            checksum: String::new(),
            payload: Payload::Funding(FundingPayload { rate: 0.01, next_funding_ms: 0 }),
        }
    }

    #[tokio::test]
    async fn returns_fresh_cached_envelope_without_fetching() {
        let facade = DataFacade::new(TieredCacheConfig::default());
        let symbol = Symbol::parse("BTC-USD").unwrap();
        let key = CacheKey::new(VenueId::Binance, symbol, "funding");
        facade.cache().put(Tier::Hot, key.clone(), envelope_at(1_000)).await;

        let result = facade
            .fetch(key, 5_000, 1_500, || async { panic!("should not fetch") })
            .await
            .unwrap();
        assert_eq!(result.timestamp_ms, 1_000);
    }

    #[tokio::test]
    async fn refetches_when_cached_entry_is_stale() {
        let facade = DataFacade::new(TieredCacheConfig::default());
        let symbol = Symbol::parse("BTC-USD").unwrap();
        let key = CacheKey::new(VenueId::Binance, symbol, "funding");
        facade.cache().put(Tier::Hot, key.clone(), envelope_at(0)).await;

        let result = facade
            .fetch(key, 1_000, 50_000, || async { Ok(envelope_at(50_000)) })
            .await
            .unwrap();
        assert_eq!(result.timestamp_ms, 50_000);
    }

    #[tokio::test]
    async fn fails_stale_when_fetch_errors_and_nothing_cached() {
        let facade = DataFacade::new(TieredCacheConfig::default());
        let symbol = Symbol::parse("ETH-USD").unwrap();
        let key = CacheKey::new(VenueId::Okx, symbol.clone(), "funding");

        let result = facade
            .fetch(key, 1_000, 1_000, || async {
                Err(FacadeError::FetchFailed { venue: VenueId::Okx, symbol, message: "timeout".into() })
            })
            .await;
        assert!(matches!(result, Err(FacadeError::Stale { .. })));
    }

    #[tokio::test]
    async fn falls_back_to_warm_tier_when_hot_is_stale_and_upstream_fails() {
        let facade = DataFacade::new(TieredCacheConfig::default());
        let symbol = Symbol::parse("SOL-USD").unwrap();
        let key = CacheKey::new(VenueId::Kraken, symbol.clone(), "funding");
        facade.cache().put(Tier::Hot, key.clone(), envelope_at(0)).await;
        facade.cache().put(Tier::Warm, key.clone(), envelope_at(9_500)).await;

        // At now=10_000 with a 1_000ms budget, Hot (age 10_000) is stale but
        // Warm (age 500) satisfies the budget and must win without a fetch.
        let result = facade
            .fetch(key, 1_000, 10_000, || async { panic!("warm tier should have satisfied the budget") })
            .await
            .unwrap();
        assert_eq!(result.timestamp_ms, 9_500);
    }
}
