//! Guard configuration: baseline and trending profiles per guard, plus the
//! absolute safety caps no profile may relax past (spec §4.9, §6).

use crate::constants::{
    FATIGUE_ACCEL_OVERRIDE_PCT, FATIGUE_MOVE_24H_PCT, FATIGUE_RSI_4H_MIN,
    FRESHNESS_ABSOLUTE_MAX_BARS_AGE, FRESHNESS_ABSOLUTE_MIN_ATR_FACTOR, LATE_FILL_MAX_SECS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One freshness profile: how many bars old a quote may be, and how much of
/// current ATR its move may consume, before it is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreshnessProfile {
    pub max_bars_age: u32,
    pub min_atr_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreshnessGuardConfig {
    pub baseline: FreshnessProfile,
    pub trending: FreshnessProfile,
    #[serde(default)]
    pub absolute_max_bars_age: Option<u32>,
    #[serde(default)]
    pub absolute_min_atr_factor: Option<f64>,
}

impl FreshnessGuardConfig {
    pub fn absolute_max_bars_age(&self) -> u32 {
        self.absolute_max_bars_age.unwrap_or(FRESHNESS_ABSOLUTE_MAX_BARS_AGE)
    }

    pub fn absolute_min_atr_factor(&self) -> f64 {
        self.absolute_min_atr_factor.unwrap_or(FRESHNESS_ABSOLUTE_MIN_ATR_FACTOR)
    }

    /// Testable Property 10: no profile may relax past the absolute caps —
    /// a profile's `max_bars_age` must not exceed the absolute cap, and its
    /// `min_atr_factor` must not fall below the absolute floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let abs_max_age = self.absolute_max_bars_age();
        let abs_min_atr = self.absolute_min_atr_factor();
        for (name, profile) in [("baseline", self.baseline), ("trending", self.trending)] {
            if profile.max_bars_age > abs_max_age {
                return Err(ConfigError::FreshnessProfileExceedsCap {
                    profile: name,
                    field: "max_bars_age",
                });
            }
            if profile.min_atr_factor < abs_min_atr {
                return Err(ConfigError::FreshnessProfileExceedsCap {
                    profile: name,
                    field: "min_atr_factor",
                });
            }
        }
        Ok(())
    }
}

impl Default for FreshnessGuardConfig {
    /// Baseline and trending profiles from scenario S2: baseline allows 2
    /// bars of age at 1.2x ATR; the trending profile (active only when
    /// VADR >= 1.75 and spread <= 50bps in a trending regime) extends that
    /// to 3 bars at 0.9x ATR.
    fn default() -> Self {
        Self {
            baseline: FreshnessProfile { max_bars_age: 2, min_atr_factor: 1.2 },
            trending: FreshnessProfile { max_bars_age: 3, min_atr_factor: 0.9 },
            absolute_max_bars_age: None,
            absolute_min_atr_factor: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueGuardConfig {
    #[serde(default = "default_fatigue_move")]
    pub move_24h_pct: f64,
    #[serde(default = "default_fatigue_rsi")]
    pub rsi_4h_min: f64,
    #[serde(default = "default_fatigue_accel_override")]
    pub accel_override_pct: f64,
}

fn default_fatigue_move() -> f64 {
    FATIGUE_MOVE_24H_PCT
}
fn default_fatigue_rsi() -> f64 {
    FATIGUE_RSI_4H_MIN
}
fn default_fatigue_accel_override() -> f64 {
    FATIGUE_ACCEL_OVERRIDE_PCT
}

impl Default for FatigueGuardConfig {
    fn default() -> Self {
        Self {
            move_24h_pct: FATIGUE_MOVE_24H_PCT,
            rsi_4h_min: FATIGUE_RSI_4H_MIN,
            accel_override_pct: FATIGUE_ACCEL_OVERRIDE_PCT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateFillGuardConfig {
    #[serde(default = "default_late_fill_max_secs")]
    pub max_delay_secs: i64,
}

fn default_late_fill_max_secs() -> i64 {
    LATE_FILL_MAX_SECS
}

impl Default for LateFillGuardConfig {
    fn default() -> Self {
        Self { max_delay_secs: LATE_FILL_MAX_SECS }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardsConfig {
    pub freshness: FreshnessGuardConfig,
    #[serde(default)]
    pub fatigue: FatigueGuardConfig,
    #[serde(default)]
    pub late_fill: LateFillGuardConfig,
}

impl GuardsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.freshness.validate()
    }
}

impl Default for GuardsConfig {
    fn default() -> Self {
        Self { freshness: FreshnessGuardConfig::default(), fatigue: FatigueGuardConfig::default(), late_fill: LateFillGuardConfig::default() }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{profile} freshness profile relaxes past the absolute cap on {field}")]
    FreshnessProfileExceedsCap { profile: &'static str, field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_profiles_within_absolute_caps() {
        let cfg = FreshnessGuardConfig {
            baseline: FreshnessProfile { max_bars_age: 2, min_atr_factor: 1.2 },
            trending: FreshnessProfile { max_bars_age: 4, min_atr_factor: 0.9 },
            absolute_max_bars_age: None,
            absolute_min_atr_factor: None,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_profile_relaxing_past_absolute_bars_age_cap() {
        let cfg = FreshnessGuardConfig {
            baseline: FreshnessProfile { max_bars_age: 2, min_atr_factor: 1.2 },
            trending: FreshnessProfile { max_bars_age: 6, min_atr_factor: 0.9 },
            absolute_max_bars_age: None,
            absolute_min_atr_factor: None,
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::FreshnessProfileExceedsCap { profile: "trending", field: "max_bars_age" })
        );
    }

    #[test]
    fn rejects_profile_relaxing_past_absolute_atr_floor() {
        let cfg = FreshnessGuardConfig {
            baseline: FreshnessProfile { max_bars_age: 2, min_atr_factor: 0.5 },
            trending: FreshnessProfile { max_bars_age: 4, min_atr_factor: 0.9 },
            absolute_max_bars_age: None,
            absolute_min_atr_factor: None,
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::FreshnessProfileExceedsCap { profile: "baseline", field: "min_atr_factor" })
        );
    }

    #[test]
    fn fatigue_defaults_match_scenario_s1() {
        let cfg = FatigueGuardConfig::default();
        assert_eq!(cfg.move_24h_pct, 12.0);
        assert_eq!(cfg.rsi_4h_min, 70.0);
        assert_eq!(cfg.accel_override_pct, 2.0);
    }
}
