//! `RegimeDetector`: 4-hour majority vote over the three indicators,
//! previous-regime tiebreak, weight-map validation delegated to
//! `cryptorun-config` (spec §4.7).

use crate::indicators::{IndicatorThresholds, RegimeIndicators};
use cryptorun_config::RegimeWeightsConfig;
use cryptorun_types::regime::IndicatorContribution;
use cryptorun_types::{Regime, RegimeDetection};
use tracing::info;

/// Cadence between scheduled regime re-evaluations (spec §4.7).
pub const CADENCE_MS: i64 = 4 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy)]
pub struct RegimeDetectorConfig {
    pub thresholds: IndicatorThresholds,
    pub cadence_ms: i64,
}

impl Default for RegimeDetectorConfig {
    fn default() -> Self {
        Self { thresholds: IndicatorThresholds::default(), cadence_ms: CADENCE_MS }
    }
}

pub struct RegimeDetector {
    config: RegimeDetectorConfig,
}

impl RegimeDetector {
    pub fn new(config: RegimeDetectorConfig) -> Self {
        Self { config }
    }

    /// True once `cadence_ms` has elapsed since `last_detected_at_ms`, or
    /// immediately if a detection has never run. An explicit trigger can
    /// always call `detect` directly, bypassing this check.
    pub fn is_due(&self, last_detected_at_ms: Option<i64>, now_ms: i64) -> bool {
        match last_detected_at_ms {
            None => true,
            Some(last) => now_ms - last >= self.config.cadence_ms,
        }
    }

    /// Majority vote among the three indicators; ties are broken by
    /// `previous`. Emits the full `RegimeDetection` record including
    /// per-indicator attribution.
    pub fn detect(&self, indicators: RegimeIndicators, previous: Regime, now_ms: i64) -> RegimeDetection {
        let votes = indicators.votes(&self.config.thresholds);

        let mut calm = 0u8;
        let mut normal = 0u8;
        let mut volatile = 0u8;
        for (_, _, vote) in votes {
            match vote {
                Regime::Calm => calm += 1,
                Regime::Normal => normal += 1,
                Regime::Volatile => volatile += 1,
            }
        }

        let max_votes = calm.max(normal).max(volatile);
        let winners: Vec<Regime> = [
            (Regime::Calm, calm),
            (Regime::Normal, normal),
            (Regime::Volatile, volatile),
        ]
        .into_iter()
        .filter(|(_, count)| *count == max_votes)
        .map(|(regime, _)| regime)
        .collect();

        let current = if winners.len() == 1 {
            winners[0]
        } else if winners.contains(&previous) {
            previous
        } else {
            // No indicator-vote majority and the previous regime isn't among
            // the tied leaders: keep the previous regime rather than guess.
            previous
        };

        let confidence = max_votes as f64 / votes.len() as f64;
        let changed = current != previous;
        if changed {
            info!(?previous, ?current, confidence, "regime changed");
        }

        RegimeDetection {
            detected_at_ms: now_ms,
            current,
            confidence,
            indicator_contributions: votes
                .into_iter()
                .map(|(name, value, vote)| IndicatorContribution { name: name.to_string(), value, vote })
                .collect(),
            valid_until_ms: now_ms + self.config.cadence_ms,
            previous,
            changed_at_ms: if changed { now_ms } else { 0 },
        }
    }

    /// Delegates to `cryptorun-config`'s weight-sum/bounds validation
    /// (Testable Property 1); the detector refuses to hand off a weight
    /// update the composite scorer would reject.
    pub fn validate_weights(weights: &RegimeWeightsConfig) -> Result<(), cryptorun_config::ConfigError> {
        weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanimous_vote_wins_outright() {
        let detector = RegimeDetector::new(RegimeDetectorConfig::default());
        let indicators = RegimeIndicators { realized_vol_7d: 0.05, pct_above_20ma: 0.90, breadth_thrust: 30.0 };
        let detection = detector.detect(indicators, Regime::Normal, 1_000);
        assert_eq!(detection.current, Regime::Calm);
        assert!(detection.changed_at_ms > 0);
    }

    #[test]
    fn scenario_s5_regime_flips_chop_to_calm() {
        let detector = RegimeDetector::new(RegimeDetectorConfig::default());
        let indicators = RegimeIndicators { realized_vol_7d: 0.10, pct_above_20ma: 0.80, breadth_thrust: 28.0 };
        let detection = detector.detect(indicators, Regime::Normal, 5_000);
        assert_eq!(detection.previous, Regime::Normal);
        assert_eq!(detection.current, Regime::Calm);
        assert_eq!(detection.changed_at_ms, 5_000);
    }

    #[test]
    fn tie_is_broken_by_previous_regime() {
        let detector = RegimeDetector::new(RegimeDetectorConfig::default());
        // realized_vol votes Normal, breadth votes Calm, thrust votes Volatile: 1/1/1 tie.
        let indicators = RegimeIndicators { realized_vol_7d: 0.25, pct_above_20ma: 0.90, breadth_thrust: 5.0 };
        let detection = detector.detect(indicators, Regime::Volatile, 1_000);
        assert_eq!(detection.current, Regime::Volatile);
        assert!(!(detection.changed_at_ms > 0));
    }

    #[test]
    fn is_due_respects_cadence() {
        let detector = RegimeDetector::new(RegimeDetectorConfig::default());
        assert!(detector.is_due(None, 0));
        assert!(!detector.is_due(Some(0), CADENCE_MS - 1));
        assert!(detector.is_due(Some(0), CADENCE_MS));
    }
}
