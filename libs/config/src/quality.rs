//! Bad-miss-rate policy thresholds per timeframe (spec §6 `quality_policies`).
//!
//! "Bad miss rate" is the fraction of bars in a window that the validator
//! quarantined; a timeframe whose observed rate exceeds its threshold is
//! dropped from scoring for that scan cycle rather than scored on thin data.

use cryptorun_types::Timeframe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityPoliciesConfig {
    thresholds: BTreeMap<Timeframe, f64>,
}

impl QualityPoliciesConfig {
    pub fn threshold_for(&self, timeframe: Timeframe) -> f64 {
        self.thresholds.get(&timeframe).copied().unwrap_or(DEFAULT_BAD_MISS_RATE)
    }

    pub fn exceeds(&self, timeframe: Timeframe, observed_rate: f64) -> bool {
        observed_rate > self.threshold_for(timeframe)
    }
}

/// Fallback threshold for a timeframe the config omits: 10% of bars may be
/// quarantined before the timeframe is dropped.
const DEFAULT_BAD_MISS_RATE: f64 = 0.10;

impl Default for QualityPoliciesConfig {
    fn default() -> Self {
        let thresholds = Timeframe::ALL.iter().map(|tf| (*tf, DEFAULT_BAD_MISS_RATE)).collect();
        Self { thresholds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_applies_same_threshold_to_every_timeframe() {
        let cfg = QualityPoliciesConfig::default();
        for tf in Timeframe::ALL {
            assert_eq!(cfg.threshold_for(tf), 0.10);
        }
    }

    #[test]
    fn exceeds_is_strict_greater_than() {
        let cfg = QualityPoliciesConfig::default();
        assert!(!cfg.exceeds(Timeframe::H1, 0.10));
        assert!(cfg.exceeds(Timeframe::H1, 0.1001));
    }

    #[test]
    fn per_timeframe_override_is_respected() {
        let mut cfg = QualityPoliciesConfig::default();
        cfg.thresholds.insert(Timeframe::D7, 0.25);
        assert_eq!(cfg.threshold_for(Timeframe::D7), 0.25);
        assert_eq!(cfg.threshold_for(Timeframe::H1), 0.10);
    }
}
