//! `Guard` middleware composing the token bucket, budget tracker, and
//! circuit breaker around a single `execute` entry point (Design Notes:
//! "layered middleware around a single Execute capability").

use crate::budget::BudgetTracker;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::error::TransportError;
use crate::token_bucket::TokenBucket;
use chrono::Utc;
use cryptorun_types::VenueId;
use std::collections::HashMap;
use std::future::Future;
use tracing::debug;

pub struct Guard {
    tokens: TokenBucket,
    budget: BudgetTracker,
    breakers: HashMap<VenueId, CircuitBreaker>,
}

impl Guard {
    pub fn new(tokens: TokenBucket, budget: BudgetTracker, breaker_config: CircuitBreakerConfig) -> Self {
        let breakers = VenueId::ALL
            .into_iter()
            .map(|v| (v, CircuitBreaker::new(breaker_config.clone())))
            .collect();
        Self { tokens, budget, breakers }
    }

    fn breaker(&self, venue: VenueId) -> &CircuitBreaker {
        self.breakers.get(&venue).expect("every VenueId has a breaker")
    }

    /// Executes `operation` through rate limit, budget, and circuit breaker
    /// checks, in that order. On `RATE_LIMITED`/`TIMEOUT`/upstream failure,
    /// falls back to `cached` if supplied rather than propagating the error.
    pub async fn execute<T, F, Fut>(
        &self,
        venue: VenueId,
        operation: F,
        cached: Option<T>,
    ) -> Result<T, TransportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let now = Utc::now();

        if !self.budget.check(venue, now) {
            let err = TransportError::BudgetExhausted {
                venue,
                reset_at_ms: self.budget.reset_at(venue).map(|t| t.timestamp_millis()).unwrap_or(0),
            };
            return self.fall_back_or_propagate(cached, err);
        }

        if !self.breaker(venue).should_attempt().await {
            return self.fall_back_or_propagate(cached, TransportError::CircuitOpen { venue });
        }

        if !self.tokens.allow(venue) {
            self.tokens.wait(venue).await?;
        }

        self.budget.record(venue, now);

        match operation().await {
            Ok(value) => {
                self.breaker(venue).on_success().await;
                Ok(value)
            }
            Err(err) => {
                self.breaker(venue).on_failure().await;
                debug!(%venue, %err, "operation failed, considering cache fallback");
                self.fall_back_or_propagate(cached, err)
            }
        }
    }

    fn fall_back_or_propagate<T>(&self, cached: Option<T>, err: TransportError) -> Result<T, TransportError> {
        match (cached, &err) {
            (
                Some(value),
                TransportError::RateLimited { .. }
                | TransportError::Timeout { .. }
                | TransportError::Upstream { .. },
            ) => Ok(value),
            _ => Err(err),
        }
    }
}
