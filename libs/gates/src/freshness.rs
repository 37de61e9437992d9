//! Freshness guard profile selection (spec §4.9, scenario S2).

use cryptorun_config::constants::MICROSTRUCTURE_VADR_MIN;
use cryptorun_config::{FreshnessGuardConfig, FreshnessProfile};
use cryptorun_types::Regime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileName {
    Baseline,
    Trending,
}

impl ProfileName {
    pub fn label(self) -> &'static str {
        match self {
            ProfileName::Baseline => "baseline",
            ProfileName::Trending => "trending",
        }
    }
}

/// Selects the trending profile only when VADR, spread, and regime all
/// qualify; otherwise falls back to baseline. The selected profile is
/// never relaxed past `config`'s absolute safety caps, which
/// `FreshnessGuardConfig::validate` already enforces at load time.
pub fn select_profile(
    config: &FreshnessGuardConfig,
    regime: Regime,
    vadr: f64,
    spread_bps: f64,
) -> (ProfileName, FreshnessProfile) {
    let trending_eligible = regime == Regime::Calm && vadr >= MICROSTRUCTURE_VADR_MIN && spread_bps <= 50.0;
    if trending_eligible {
        (ProfileName::Trending, config.trending)
    } else {
        (ProfileName::Baseline, config.baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s2_selects_trending_profile() {
        let config = FreshnessGuardConfig::default();
        let (name, profile) = select_profile(&config, Regime::Calm, 2.0, 40.0);
        assert_eq!(name, ProfileName::Trending);
        assert_eq!(profile.max_bars_age, 3);
    }

    #[test]
    fn scenario_s2_falls_back_to_baseline_below_vadr_threshold() {
        let config = FreshnessGuardConfig::default();
        let (name, _) = select_profile(&config, Regime::Calm, 1.5, 40.0);
        assert_eq!(name, ProfileName::Baseline);
    }

    #[test]
    fn non_trending_regime_never_uses_trending_profile() {
        let config = FreshnessGuardConfig::default();
        let (name, _) = select_profile(&config, Regime::Normal, 2.0, 40.0);
        assert_eq!(name, ProfileName::Baseline);
    }
}
