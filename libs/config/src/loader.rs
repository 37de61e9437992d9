//! Layered config loading: defaults, then an optional file, then environment
//! overrides, with eager validation so a malformed config fails before a
//! scan starts rather than mid-run.

use crate::guards::GuardsConfig;
use crate::quality::QualityPoliciesConfig;
use crate::regime_weights::RegimeWeightsConfig;
use config_crate::{Config, ConfigError as RawConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub regime_weights: RegimeWeightsConfig,
    pub guards: GuardsConfig,
    #[serde(default)]
    pub quality: QualityPoliciesConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), LoadError> {
        self.regime_weights.validate().map_err(|e| LoadError::Invalid(e.to_string()))?;
        self.guards.validate().map_err(|e| LoadError::Invalid(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("config source error: {0}")]
    Source(#[from] RawConfigError),

    #[error("config failed validation: {0}")]
    Invalid(String),
}

/// Loads config from an optional file path layered under `CRYPTORUN_`
/// environment overrides (e.g. `CRYPTORUN_GUARDS__LATE_FILL__MAX_DELAY_SECS`),
/// then validates eagerly.
pub fn load(path: Option<&Path>) -> Result<AppConfig, LoadError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        info!(path = %path.display(), "loading config file");
        builder = builder.add_source(File::from(path));
    } else {
        warn!("no config path given; relying on environment overrides and field defaults");
    }

    builder = builder.add_source(Environment::with_prefix("CRYPTORUN").separator("__"));

    let raw = builder.build()?;
    let app: AppConfig = raw.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::{FatigueGuardConfig, FreshnessGuardConfig, FreshnessProfile, LateFillGuardConfig};
    use crate::regime_weights::RegimeWeights;
    use std::io::Write;

    fn sample_yaml() -> &'static str {
        r#"
regime_weights:
  calm:
    momentum_core: 0.40
    technical_resid: 0.30
    supply_demand_block: 0.20
    catalyst_block: 0.10
  normal:
    momentum_core: 0.35
    technical_resid: 0.30
    supply_demand_block: 0.20
    catalyst_block: 0.15
  volatile:
    momentum_core: 0.30
    technical_resid: 0.25
    supply_demand_block: 0.25
    catalyst_block: 0.20
guards:
  freshness:
    baseline:
      max_bars_age: 2
      min_atr_factor: 1.2
    trending:
      max_bars_age: 4
      min_atr_factor: 0.9
"#
    }

    #[test]
    fn loads_and_validates_sample_config() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{}", sample_yaml()).unwrap();
        let cfg = load(Some(file.path())).expect("config should load");
        assert!(cfg.regime_weights.calm.momentum_core > 0.0);
    }

    #[test]
    fn rejects_config_that_fails_weight_validation() {
        let bad = sample_yaml().replace("momentum_core: 0.40", "momentum_core: 40.0");
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{}", bad).unwrap();
        assert!(matches!(load(Some(file.path())), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn default_guard_struct_is_directly_constructible() {
        let guards = GuardsConfig {
            freshness: FreshnessGuardConfig {
                baseline: FreshnessProfile { max_bars_age: 2, min_atr_factor: 1.2 },
                trending: FreshnessProfile { max_bars_age: 4, min_atr_factor: 0.9 },
                absolute_max_bars_age: None,
                absolute_min_atr_factor: None,
            },
            fatigue: FatigueGuardConfig::default(),
            late_fill: LateFillGuardConfig::default(),
        };
        assert!(guards.validate().is_ok());
        let _ = RegimeWeights {
            momentum_core: 0.4,
            technical_resid: 0.3,
            supply_demand_block: 0.2,
            catalyst_block: 0.1,
        };
    }
}
