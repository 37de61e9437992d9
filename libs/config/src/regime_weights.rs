//! Per-regime weight maps (spec §6 config files, §4.7 validation).
//!
//! Weight representation is 1.0-based (spec §9 Open Questions — resolved):
//! a config whose buckets sum to ~100 instead of ~1.0 is rejected at load
//! rather than silently rescaled.

use crate::constants::{REGIME_WEIGHT_MAX, REGIME_WEIGHT_MIN, REGIME_WEIGHT_SUM_TOLERANCE};
use cryptorun_types::Regime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The four weight buckets named in spec §6: `momentum_core`,
/// `technical_resid` (technical + volume + quality residuals combined),
/// `supply_demand_block`, `catalyst_block`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeWeights {
    pub momentum_core: f64,
    pub technical_resid: f64,
    pub supply_demand_block: f64,
    pub catalyst_block: f64,
}

impl RegimeWeights {
    pub fn sum(&self) -> f64 {
        self.momentum_core + self.technical_resid + self.supply_demand_block + self.catalyst_block
    }

    pub fn as_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("momentum_core".to_string(), self.momentum_core),
            ("technical_resid".to_string(), self.technical_resid),
            ("supply_demand_block".to_string(), self.supply_demand_block),
            ("catalyst_block".to_string(), self.catalyst_block),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeWeightsConfig {
    pub calm: RegimeWeights,
    pub normal: RegimeWeights,
    pub volatile: RegimeWeights,
    #[serde(default)]
    pub sum_tolerance: Option<f64>,
    #[serde(default)]
    pub min_weight: Option<f64>,
    #[serde(default)]
    pub max_weight: Option<f64>,
}

impl RegimeWeightsConfig {
    pub fn for_regime(&self, regime: Regime) -> RegimeWeights {
        match regime {
            Regime::Calm => self.calm,
            Regime::Normal => self.normal,
            Regime::Volatile => self.volatile,
        }
    }

    /// Validates Testable Property 1: `Σ weights[R] = 1.0 ± tolerance` and
    /// each weight in `[min, max]`, for all three regimes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.sum_tolerance.unwrap_or(REGIME_WEIGHT_SUM_TOLERANCE);
        let min = self.min_weight.unwrap_or(REGIME_WEIGHT_MIN);
        let max = self.max_weight.unwrap_or(REGIME_WEIGHT_MAX);

        for regime in Regime::ALL {
            let weights = self.for_regime(regime);
            let sum = weights.sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(ConfigError::WeightSumOutOfTolerance {
                    regime: regime.label(),
                    sum,
                    tolerance,
                });
            }
            for (name, value) in weights.as_map() {
                if value < min || value > max {
                    return Err(ConfigError::WeightOutOfBounds {
                        regime: regime.label(),
                        bucket: name,
                        value,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("regime {regime} weights sum to {sum} (outside 1.0 ± {tolerance})")]
    WeightSumOutOfTolerance { regime: &'static str, sum: f64, tolerance: f64 },

    #[error("regime {regime} bucket '{bucket}' = {value} is outside [{min}, {max}]")]
    WeightOutOfBounds { regime: &'static str, bucket: String, value: f64, min: f64, max: f64 },

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_weights() -> RegimeWeights {
        RegimeWeights {
            momentum_core: 0.40,
            technical_resid: 0.30,
            supply_demand_block: 0.20,
            catalyst_block: 0.10,
        }
    }

    #[test]
    fn accepts_config_within_tolerance_and_bounds() {
        let cfg = RegimeWeightsConfig {
            calm: valid_weights(),
            normal: valid_weights(),
            volatile: valid_weights(),
            sum_tolerance: None,
            min_weight: None,
            max_weight: None,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_hundred_based_scale() {
        let hundred_based = RegimeWeights {
            momentum_core: 40.0,
            technical_resid: 30.0,
            supply_demand_block: 20.0,
            catalyst_block: 10.0,
        };
        let cfg = RegimeWeightsConfig {
            calm: hundred_based,
            normal: valid_weights(),
            volatile: valid_weights(),
            sum_tolerance: None,
            min_weight: None,
            max_weight: None,
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::WeightSumOutOfTolerance { .. })));
    }

    #[test]
    fn rejects_bucket_below_minimum() {
        let mut weights = valid_weights();
        weights.catalyst_block = 0.01;
        weights.momentum_core += 0.09; // keep sum at 1.0
        let cfg = RegimeWeightsConfig {
            calm: weights,
            normal: valid_weights(),
            volatile: valid_weights(),
            sum_tolerance: None,
            min_weight: None,
            max_weight: None,
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::WeightOutOfBounds { .. })));
    }
}
