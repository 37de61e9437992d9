//! [`CompositeScore`]: the regime-weighted, attribution-tracked score.

use crate::regime::Regime;
use crate::venue::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub weight: f64,
    pub residualized_value: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
    pub symbol: Symbol,
    /// Clamped to [0, 110].
    pub score: f64,
    pub rank: Option<u32>,
    pub contributions: BTreeMap<String, FactorContribution>,
    pub regime: Regime,
    pub weights: BTreeMap<String, f64>,
    pub social_contribution: f64,
    pub social_capped: bool,
}

impl CompositeScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 110.0;
    pub const SOCIAL_CAP: f64 = 10.0;
}
