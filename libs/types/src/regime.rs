//! Market regime classification.
//!
//! Canonical triple is `{Calm, Normal, Volatile}`; `{Trending, Chop,
//! HighVol}` from the source material name the same three states (spec §9
//! Open Questions — resolved, not left ambiguous) and are documented here as
//! synonyms only, never as separate variants.

use serde::{Deserialize, Serialize};

/// - `Calm` (a.k.a. trending): low realized volatility, broad participation above trend.
/// - `Normal` (a.k.a. chop): the default, range-bound state.
/// - `Volatile` (a.k.a. high-vol): elevated realized volatility, breadth deteriorating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Calm,
    Normal,
    Volatile,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::Calm, Regime::Normal, Regime::Volatile];

    pub fn label(self) -> &'static str {
        match self {
            Regime::Calm => "calm",
            Regime::Normal => "normal",
            Regime::Volatile => "volatile",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorContribution {
    pub name: String,
    pub value: f64,
    pub vote: Regime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeDetection {
    pub detected_at_ms: i64,
    pub current: Regime,
    pub confidence: f64,
    pub indicator_contributions: Vec<IndicatorContribution>,
    pub valid_until_ms: i64,
    pub previous: Regime,
    pub changed_at_ms: i64,
}
