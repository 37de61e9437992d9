//! Daily call budget tracking with a UTC-midnight reset (AMBIENT, new — no
//! direct teacher counterpart; built in the teacher's atomics +
//! `parking_lot::RwLock` idiom for shared mutable state, `tracing::warn!`
//! at the 80% threshold mirroring the teacher's circuit breaker).

use chrono::{DateTime, Duration, TimeZone, Utc};
use cryptorun_types::VenueId;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

struct VenueBudget {
    used: AtomicU64,
    limit: u64,
    warned_80pct: AtomicU64, // 0/1 used as a bool to avoid repeat warnings per day
    reset_at: RwLock<DateTime<Utc>>,
}

fn next_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = (now + Duration::days(1)).date_naive();
    Utc.from_utc_datetime(&tomorrow.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

/// Tracks per-venue daily call counts, resetting every UTC midnight.
pub struct BudgetTracker {
    venues: Arc<DashMap<VenueId, VenueBudget>>,
}

impl BudgetTracker {
    pub fn new() -> Self {
        Self { venues: Arc::new(DashMap::new()) }
    }

    pub fn configure_venue(&self, venue: VenueId, daily_limit: u64, now: DateTime<Utc>) {
        self.venues.insert(
            venue,
            VenueBudget {
                used: AtomicU64::new(0),
                limit: daily_limit,
                warned_80pct: AtomicU64::new(0),
                reset_at: RwLock::new(next_utc_midnight(now)),
            },
        );
    }

    fn maybe_reset(&self, budget: &VenueBudget, now: DateTime<Utc>) {
        let mut reset_at = budget.reset_at.write();
        if now >= *reset_at {
            budget.used.store(0, Ordering::Relaxed);
            budget.warned_80pct.store(0, Ordering::Relaxed);
            *reset_at = next_utc_midnight(now);
        }
    }

    /// True if at least one call remains in today's budget for `venue`.
    /// Venues with no configured budget are treated as unlimited.
    pub fn check(&self, venue: VenueId, now: DateTime<Utc>) -> bool {
        let Some(budget) = self.venues.get(&venue) else { return true };
        self.maybe_reset(&budget, now);
        budget.used.load(Ordering::Relaxed) < budget.limit
    }

    /// Records one consumed call, warning once per day at 80% usage.
    pub fn record(&self, venue: VenueId, now: DateTime<Utc>) {
        let Some(budget) = self.venues.get(&venue) else { return };
        self.maybe_reset(&budget, now);
        let used = budget.used.fetch_add(1, Ordering::Relaxed) + 1;
        if budget.limit > 0 && used * 100 >= budget.limit * 80 {
            if budget.warned_80pct.swap(1, Ordering::Relaxed) == 0 {
                warn!(%venue, used, limit = budget.limit, "venue daily budget at 80%");
            }
        }
    }

    /// Returns when the budget for `venue` next resets, if configured.
    pub fn reset_at(&self, venue: VenueId) -> Option<DateTime<Utc>> {
        self.venues.get(&venue).map(|b| *b.reset_at.read())
    }
}

impl Default for BudgetTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn check_is_true_below_limit_and_false_at_limit() {
        let tracker = BudgetTracker::new();
        let now = Utc.with_ymd_and_hms(2026, 7, 30, 12, 0, 0).unwrap();
        tracker.configure_venue(VenueId::Binance, 2, now);
        assert!(tracker.check(VenueId::Binance, now));
        tracker.record(VenueId::Binance, now);
        assert!(tracker.check(VenueId::Binance, now));
        tracker.record(VenueId::Binance, now);
        assert!(!tracker.check(VenueId::Binance, now));
    }

    #[test]
    fn resets_at_utc_midnight() {
        let tracker = BudgetTracker::new();
        let now = Utc.with_ymd_and_hms(2026, 7, 30, 23, 59, 0).unwrap();
        tracker.configure_venue(VenueId::Okx, 1, now);
        tracker.record(VenueId::Okx, now);
        assert!(!tracker.check(VenueId::Okx, now));

        let next_day = Utc.with_ymd_and_hms(2026, 7, 31, 0, 0, 1).unwrap();
        assert!(tracker.check(VenueId::Okx, next_day));
    }

    #[test]
    fn unconfigured_venue_has_unlimited_budget() {
        let tracker = BudgetTracker::new();
        let now = Utc.with_ymd_and_hms(2026, 7, 30, 0, 0, 0).unwrap();
        assert!(tracker.check(VenueId::Kraken, now));
    }
}
