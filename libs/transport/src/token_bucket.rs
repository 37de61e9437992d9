//! Per-host rate limiting, rebuilt from the teacher's `RateLimiter` as an
//! explicit `governor`-backed token bucket exposing both a non-blocking
//! `allow` and a suspending `wait`.

use crate::error::TransportError;
use cryptorun_types::VenueId;
use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Continuous-accumulation token bucket keyed by venue (one bucket per host,
/// per spec §4.2). Unconfigured venues are allowed through — mirrors the
/// teacher's `RateLimiter::check` fallback.
#[derive(Clone)]
pub struct TokenBucket {
    limiters: Arc<DashMap<VenueId, Arc<DefaultDirectRateLimiter>>>,
}

impl TokenBucket {
    pub fn new() -> Self {
        Self { limiters: Arc::new(DashMap::new()) }
    }

    pub fn configure_venue(&self, venue: VenueId, requests_per_minute: u32) {
        let rate = NonZeroU32::new(requests_per_minute).unwrap_or(nonzero!(1u32));
        let limiter = Arc::new(DefaultDirectRateLimiter::direct(Quota::per_minute(rate)));
        self.limiters.insert(venue, limiter);
    }

    /// Non-blocking check: true if a token was available and consumed.
    pub fn allow(&self, venue: VenueId) -> bool {
        self.limiters.get(&venue).map(|l| l.check().is_ok()).unwrap_or(true)
    }

    /// Suspends the caller until a token is available.
    pub async fn wait(&self, venue: VenueId) -> Result<(), TransportError> {
        if let Some(limiter) = self.limiters.get(&venue) {
            let limiter = limiter.clone();
            limiter.until_ready().await;
        }
        Ok(())
    }
}

impl Default for TokenBucket {
    fn default() -> Self {
        let bucket = Self::new();
        bucket.configure_venue(VenueId::Binance, 1200);
        bucket.configure_venue(VenueId::Okx, 600);
        bucket.configure_venue(VenueId::Coinbase, 600);
        bucket.configure_venue(VenueId::Kraken, 900);
        bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_venue_is_always_allowed() {
        let bucket = TokenBucket::new();
        assert!(bucket.allow(VenueId::Binance));
        assert!(bucket.allow(VenueId::Binance));
    }

    #[test]
    fn configured_venue_exhausts_then_refuses() {
        let bucket = TokenBucket::new();
        bucket.configure_venue(VenueId::Okx, 60); // burst of 1/sec, quota starts full at 60
        let mut allowed = 0;
        for _ in 0..100 {
            if bucket.allow(VenueId::Okx) {
                allowed += 1;
            }
        }
        assert!(allowed < 100, "bucket should have started refusing after burst capacity");
    }
}
