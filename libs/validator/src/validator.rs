//! `Validator`: per-`(symbol, field)` rolling windows with MAD z-score,
//! volume spike rule, corruption checks, and warm-up gating.

use crate::quarantine::{Quarantine, QuarantineReason, Severity};
use crate::window::RollingWindow;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub window_size: usize,
    pub mad_z_threshold: f64,
    pub spike_multiple: f64,
    pub warm_up_min_points: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { window_size: 100, mad_z_threshold: 3.0, spike_multiple: 5.0, warm_up_min_points: 20 }
    }
}

/// Whether `field` is volume-like, which additionally triggers the
/// spike-multiple rule.
fn is_volume_field(field: &str) -> bool {
    field.contains("volume") || field.contains("vadr")
}

pub struct Validator {
    config: ValidatorConfig,
    windows: HashMap<(String, String), RollingWindow>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config, windows: HashMap::new() }
    }

    fn window_mut(&mut self, symbol: &str, field: &str) -> &mut RollingWindow {
        self.windows
            .entry((symbol.to_string(), field.to_string()))
            .or_insert_with(|| RollingWindow::new(self.config.window_size))
    }

    /// Validates one observation for `(symbol, field)`, returning
    /// `Some(Quarantine)` if it should be rejected. On success, the value is
    /// folded into the rolling window regardless of whether it was
    /// previously quarantined for a different field.
    pub fn validate(&mut self, symbol: &str, field: &str, value: f64) -> Option<Quarantine> {
        if let Some(q) = corruption_check(field, value) {
            debug!(symbol, field, value, "corruption check failed");
            return Some(q);
        }

        let mad_z_threshold = self.config.mad_z_threshold;
        let spike_multiple = self.config.spike_multiple;
        let warm_up_min_points = self.config.warm_up_min_points;
        let volume_field = is_volume_field(field);

        let window = self.window_mut(symbol, field);
        let past_warm_up = window.is_ready(warm_up_min_points);

        let quarantine = if past_warm_up {
            let (median, mad) = window.mad();
            let z = mad_z_score(value, median, mad);
            if z.abs() > mad_z_threshold {
                Some(Quarantine::new(field, QuarantineReason::MadZScoreExceeded, Severity::Warning, z, mad_z_threshold))
            } else if volume_field && median > 0.0 && value > median * spike_multiple {
                Some(Quarantine::new(
                    field,
                    QuarantineReason::SpikeMultipleExceeded,
                    Severity::Warning,
                    value,
                    median * spike_multiple,
                ))
            } else {
                None
            }
        } else {
            None
        };

        window.push(value);
        quarantine
    }
}

/// Robust z-score using MAD scaled by the standard consistency constant for
/// a normal distribution (1.4826), per Testable Property convention.
fn mad_z_score(value: f64, median: f64, mad: f64) -> f64 {
    if mad == 0.0 {
        return if value == median { 0.0 } else { f64::INFINITY * (value - median).signum() };
    }
    0.6745 * (value - median) / mad
}

fn corruption_check(field: &str, value: f64) -> Option<Quarantine> {
    if !value.is_finite() {
        return Some(Quarantine::new(field, QuarantineReason::NonFiniteValue, Severity::Critical, value, 0.0));
    }
    if field.contains("price") && value <= 0.0 {
        return Some(Quarantine::new(field, QuarantineReason::NonPositivePrice, Severity::Critical, value, 0.0));
    }
    if field.contains("volume") && value < 0.0 {
        return Some(Quarantine::new(field, QuarantineReason::NegativeVolume, Severity::Critical, value, 0.0));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corruption_checks_apply_during_warm_up() {
        let mut v = Validator::new(ValidatorConfig::default());
        let q = v.validate("BTC-USD", "price", -1.0).unwrap();
        assert_eq!(q.severity, Severity::Critical);
        assert_eq!(q.reason, QuarantineReason::NonPositivePrice);
    }

    #[test]
    fn non_finite_value_is_always_critical() {
        let mut v = Validator::new(ValidatorConfig::default());
        let q = v.validate("BTC-USD", "price", f64::NAN).unwrap();
        assert_eq!(q.reason, QuarantineReason::NonFiniteValue);
    }

    #[test]
    fn no_mad_rejection_before_warm_up_threshold() {
        let mut v = Validator::new(ValidatorConfig::default());
        for _ in 0..19 {
            assert!(v.validate("BTC-USD", "price", 100.0).is_none());
        }
        // 20th point is a wild outlier but warm-up only just reached; still
        // evaluated since is_ready(20) becomes true before this push.
        let result = v.validate("BTC-USD", "price", 100.0);
        assert!(result.is_none());
    }

    #[test]
    fn rejects_mad_z_outlier_after_warm_up() {
        let mut v = Validator::new(ValidatorConfig::default());
        for _ in 0..25 {
            v.validate("BTC-USD", "price", 100.0);
        }
        let q = v.validate("BTC-USD", "price", 10_000.0).unwrap();
        assert_eq!(q.reason, QuarantineReason::MadZScoreExceeded);
    }

    #[test]
    fn rejects_volume_spike_above_multiple() {
        let mut v = Validator::new(ValidatorConfig::default());
        for _ in 0..25 {
            v.validate("BTC-USD", "volume", 1_000.0);
        }
        let q = v.validate("BTC-USD", "volume", 10_000.0);
        assert!(q.is_some());
    }

    #[test]
    fn distinct_fields_have_independent_windows() {
        let mut v = Validator::new(ValidatorConfig::default());
        for _ in 0..25 {
            v.validate("BTC-USD", "price", 100.0);
        }
        assert!(v.validate("BTC-USD", "volume", 1.0).is_none());
    }
}
