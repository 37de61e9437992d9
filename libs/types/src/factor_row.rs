//! [`FactorRow`]: the per-symbol factor vector produced by the technical
//! factor engine and mutated in place by the orthogonalizer.

use crate::venue::Symbol;
use serde::{Deserialize, Serialize};

/// The protected factor vector. Never residualized (spec §4.6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentumCore {
    pub r1h: f64,
    pub r4h: f64,
    pub r12h: f64,
    pub r24h: f64,
    pub r7d: f64,
    pub accel_4h: f64,
    pub atr_1h: f64,
    pub atr_4h: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalFactors {
    pub rsi: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub hurst: f64,
    pub atr_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeFactors {
    pub surge_vs_mean: f64,
    pub vadr: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityFactors {
    pub spread_bps: f64,
    pub depth_usd_pm2: f64,
    pub book_imbalance: f64,
}

/// Residuals attached by the orthogonalizer; `None` until that stage runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Residuals {
    pub technical: f64,
    pub volume: f64,
    pub quality: f64,
    pub max_off_diagonal_correlation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorRow {
    pub symbol: Symbol,
    pub timestamp_ms: i64,
    pub momentum_core: MomentumCore,
    pub technical: TechnicalFactors,
    pub volume: VolumeFactors,
    pub quality: QualityFactors,
    pub social_raw: f64,
    pub residuals: Option<Residuals>,
    /// `false` when any upstream indicator reported an invalid/insufficient-bars flag;
    /// a row with `valid = false` must not reach the composite scorer.
    pub valid: bool,
    /// Non-fatal orthogonality QA warning attached after residualization.
    pub orthogonality_warning: Option<String>,
}

impl FactorRow {
    pub fn new(symbol: Symbol, timestamp_ms: i64) -> Self {
        Self {
            symbol,
            timestamp_ms,
            momentum_core: MomentumCore::default(),
            technical: TechnicalFactors::default(),
            volume: VolumeFactors::default(),
            quality: QualityFactors::default(),
            social_raw: 0.0,
            residuals: None,
            valid: true,
            orthogonality_warning: None,
        }
    }

    pub fn mark_invalid(&mut self) {
        self.valid = false;
    }
}
