//! Funding-rate and open-interest signals feed two of the ten entry gates
//! but aren't part of the `VenueAdapter` capability surface (spec scopes
//! venue adapters to book/kline retrieval). `FundingOiSource` is the seam a
//! derivatives-data collaborator plugs into; `NeutralFundingOiSource` is the
//! fail-closed default when none is wired, so those two gates simply never
//! pass rather than fabricating a value.

use async_trait::async_trait;
use cryptorun_types::{Symbol, VenueId};

#[derive(Debug, Clone, Copy, Default)]
pub struct FundingOiSnapshot {
    pub funding_z_score: f64,
    pub funding_cross_venue_divergence: bool,
    pub oi_residual_usd: f64,
}

#[async_trait]
pub trait FundingOiSource: Send + Sync {
    async fn snapshot(&self, venue: VenueId, symbol: &Symbol) -> FundingOiSnapshot;
}

#[derive(Debug, Default)]
pub struct NeutralFundingOiSource;

#[async_trait]
impl FundingOiSource for NeutralFundingOiSource {
    async fn snapshot(&self, _venue: VenueId, _symbol: &Symbol) -> FundingOiSnapshot {
        FundingOiSnapshot::default()
    }
}
