//! `GateCascade`: the ten-gate entry pipeline (spec §4.9). Every gate is
//! always evaluated and recorded — "first failure short-circuits" governs
//! the overall pass/fail verdict, not which checks get computed, so the
//! emitted `EntryResult` stays fully explainable regardless of where in the
//! order a candidate first fails (Testable Property 7's monotonicity check
//! also requires every gate's intermediate value to be available).

use crate::freshness::select_profile;
use crate::input::GateInput;
use cryptorun_config::constants::{
    ADV_USD_MIN, ADX_TREND_MIN, DEPTH_USD_PM2_MIN, FUNDING_Z_MIN, HURST_TREND_MIN, MICROSTRUCTURE_VADR_MIN,
    OI_RESIDUAL_USD_MIN, SCORE_GATE_MIN, SPREAD_BPS_MAX,
};
use cryptorun_config::GuardsConfig;
use cryptorun_types::{CandidateState, EntryResult, GateCheck, Regime, Symbol};

pub struct GateCascade<'a> {
    guards: &'a GuardsConfig,
}

fn check(name: &str, value: f64, threshold: f64, passed: bool, reason: Option<&str>) -> GateCheck {
    GateCheck { name: name.to_string(), value, threshold, passed, reason: reason.map(str::to_string) }
}

fn movement_threshold_pct(regime: Regime) -> f64 {
    match regime {
        Regime::Calm => 2.5,
        Regime::Normal => 3.0,
        Regime::Volatile => 4.0,
    }
}

impl<'a> GateCascade<'a> {
    pub fn new(guards: &'a GuardsConfig) -> Self {
        Self { guards }
    }

    pub fn evaluate(&self, symbol: Symbol, input: &GateInput, signal_time_ms: i64, fill_time_ms: i64, evaluation_ms: u64) -> EntryResult {
        let mut checks = Vec::with_capacity(12);

        checks.push(check("score", input.score, SCORE_GATE_MIN, input.score >= SCORE_GATE_MIN, Some("SCORE_BELOW")));

        let movement_threshold = movement_threshold_pct(input.regime);
        checks.push(check(
            "movement",
            input.move_24h_pct,
            movement_threshold,
            input.move_24h_pct >= movement_threshold,
            Some("MOVEMENT_LOW"),
        ));

        checks.push(check("adv", input.adv_usd, ADV_USD_MIN, input.adv_usd >= ADV_USD_MIN, Some("ADV_LOW")));

        checks.push(check(
            "spread",
            input.spread_bps,
            SPREAD_BPS_MAX,
            input.spread_bps <= SPREAD_BPS_MAX,
            Some("SPREAD_WIDE"),
        ));
        checks.push(check(
            "depth",
            input.depth_usd_pm2,
            DEPTH_USD_PM2_MIN,
            input.depth_usd_pm2 >= DEPTH_USD_PM2_MIN,
            Some("DEPTH_THIN"),
        ));
        checks.push(check(
            "vadr",
            input.vadr,
            MICROSTRUCTURE_VADR_MIN,
            input.vadr >= MICROSTRUCTURE_VADR_MIN,
            Some("VADR_LOW"),
        ));

        let trend_strong = input.adx >= ADX_TREND_MIN || input.hurst >= HURST_TREND_MIN;
        checks.push(check("trend_strength", input.adx, ADX_TREND_MIN, trend_strong, Some("TREND_WEAK")));

        let funding_ok = input.funding_z_score >= FUNDING_Z_MIN && input.funding_cross_venue_divergence;
        checks.push(check("funding_divergence", input.funding_z_score, FUNDING_Z_MIN, funding_ok, Some("FUNDING_DIV_LOW")));

        let oi_ok = input.oi_residual_usd.abs() >= OI_RESIDUAL_USD_MIN;
        checks.push(check("oi_residual", input.oi_residual_usd.abs(), OI_RESIDUAL_USD_MIN, oi_ok, Some("OI_RESIDUAL_LOW")));

        let (profile_name, profile) = select_profile(&self.guards.freshness, input.regime, input.vadr, input.spread_bps);
        let max_move = profile.min_atr_factor * input.atr_1h;
        let freshness_bars_ok = input.bars_age <= profile.max_bars_age;
        let freshness_move_ok = input.price_move_abs <= max_move;
        let freshness_ok = freshness_bars_ok && freshness_move_ok;
        let freshness_reason = if !freshness_bars_ok {
            "STALE_BARS"
        } else if !freshness_move_ok {
            "PRICE_MOVED"
        } else {
            "too_old"
        };
        let mut freshness_check = check(
            "freshness",
            input.bars_age as f64,
            profile.max_bars_age as f64,
            freshness_ok,
            if freshness_ok { None } else { Some(freshness_reason) },
        );
        freshness_check.reason = freshness_check.reason.map(|r| format!("{r} (profile={})", profile_name.label()));
        checks.push(freshness_check);

        let fatigue_cfg = self.guards.fatigue;
        let fatigue_triggered = input.move_24h_pct > fatigue_cfg.move_24h_pct && input.rsi_4h > fatigue_cfg.rsi_4h_min;
        let accel_override = input.accel_4h_pct > fatigue_cfg.accel_override_pct;
        let fatigue_ok = !fatigue_triggered || accel_override;
        let fatigue_reason = if fatigue_ok {
            if fatigue_triggered { Some("fatigue_acceleration_override") } else { None }
        } else {
            Some("FATIGUED")
        };
        checks.push(check("fatigue", input.move_24h_pct, fatigue_cfg.move_24h_pct, fatigue_ok, fatigue_reason));

        let late_fill_cfg = self.guards.late_fill;
        let delay = fill_time_ms.saturating_sub(signal_time_ms) / 1000;
        let late_fill_ok = (0..=late_fill_cfg.max_delay_secs).contains(&delay);
        checks.push(check(
            "late_fill",
            delay as f64,
            late_fill_cfg.max_delay_secs as f64,
            late_fill_ok,
            Some("LATE_FILL"),
        ));

        let overall_pass = checks.iter().all(|c| c.passed);
        let failure_reasons: Vec<String> =
            checks.iter().filter(|c| !c.passed).filter_map(|c| c.reason.clone()).collect();
        let passed_gates: Vec<String> = checks.iter().filter(|c| c.passed).map(|c| c.name.clone()).collect();

        EntryResult {
            symbol,
            overall_pass,
            checks,
            failure_reasons,
            passed_gates,
            evaluation_ms,
            timestamp_ms: fill_time_ms,
            state: if overall_pass { CandidateState::Pass } else { CandidateState::Fail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_input() -> GateInput {
        GateInput {
            score: 80.0,
            regime: Regime::Normal,
            move_24h_pct: 5.0,
            adv_usd: 1_000_000.0,
            spread_bps: 10.0,
            depth_usd_pm2: 200_000.0,
            vadr: 2.0,
            adx: 30.0,
            hurst: 0.4,
            funding_z_score: 2.5,
            funding_cross_venue_divergence: true,
            oi_residual_usd: 2_000_000.0,
            bars_age: 1,
            price_move_abs: 0.5,
            atr_1h: 1.0,
            rsi_4h: 50.0,
            accel_4h_pct: 0.0,
            fill_delay_secs: 10,
        }
    }

    fn cascade(guards: &GuardsConfig) -> GateCascade<'_> {
        GateCascade::new(guards)
    }

    #[test]
    fn all_gates_pass_on_healthy_candidate() {
        let guards = GuardsConfig::default();
        let input = passing_input();
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 10_000, 5);
        assert!(result.overall_pass);
        assert_eq!(result.state, CandidateState::Pass);
        assert!(result.failure_reasons.is_empty());
    }

    #[test]
    fn score_below_threshold_fails_score_gate_only_reason() {
        let guards = GuardsConfig::default();
        let mut input = passing_input();
        input.score = 74.9;
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 10_000, 5);
        assert!(!result.overall_pass);
        assert!(result.failure_reasons.contains(&"SCORE_BELOW".to_string()));
    }

    #[test]
    fn scenario_s1_fatigue_acceleration_override() {
        let guards = GuardsConfig::default();
        let mut input = passing_input();
        input.move_24h_pct = 13.2;
        input.rsi_4h = 72.0;
        input.accel_4h_pct = 1.8;
        // 24h move of 13.2 also exceeds the chop movement threshold comfortably.
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 10_000, 5);
        let fatigue = result.checks.iter().find(|c| c.name == "fatigue").unwrap();
        assert!(fatigue.passed);
        assert_eq!(fatigue.reason.as_deref(), Some("fatigue_acceleration_override"));
    }

    #[test]
    fn testable_property_9_boundary_passes_strict_exceed_fails() {
        let guards = GuardsConfig::default();
        let mut input = passing_input();
        input.move_24h_pct = 12.0;
        input.rsi_4h = 70.0;
        input.accel_4h_pct = 0.0;
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 10_000, 5);
        let fatigue = result.checks.iter().find(|c| c.name == "fatigue").unwrap();
        assert!(fatigue.passed, "exact equality on both thresholds must pass");

        input.move_24h_pct = 12.01;
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 10_000, 5);
        let fatigue = result.checks.iter().find(|c| c.name == "fatigue").unwrap();
        assert!(!fatigue.passed, "strict excess on both must block");
    }

    #[test]
    fn scenario_s3_late_fill_boundaries() {
        let guards = GuardsConfig::default();
        let input = passing_input();
        let ok = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 30_000, 5);
        assert!(ok.checks.iter().find(|c| c.name == "late_fill").unwrap().passed);

        let late = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 31_000, 5);
        assert!(!late.checks.iter().find(|c| c.name == "late_fill").unwrap().passed);
    }

    #[test]
    fn negative_fill_delay_fails() {
        let guards = GuardsConfig::default();
        let input = passing_input();
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 10_000, 0, 5);
        assert!(!result.checks.iter().find(|c| c.name == "late_fill").unwrap().passed);
    }

    #[test]
    fn scenario_s2_trending_profile_then_fallback() {
        let guards = GuardsConfig::default();
        let mut input = passing_input();
        input.regime = Regime::Calm;
        input.bars_age = 3;
        input.atr_1h = 1.0;
        input.price_move_abs = 0.9;
        input.vadr = 2.0;
        input.spread_bps = 40.0;
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 10_000, 5);
        let freshness = result.checks.iter().find(|c| c.name == "freshness").unwrap();
        assert!(freshness.passed);
        assert!(freshness.reason.is_none());

        input.vadr = 1.5;
        let result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &input, 0, 10_000, 5);
        let freshness = result.checks.iter().find(|c| c.name == "freshness").unwrap();
        assert!(!freshness.passed);
        assert!(freshness.reason.as_deref().unwrap().starts_with("too_old"));
    }

    #[test]
    fn monotone_in_score_holding_other_inputs_constant() {
        let guards = GuardsConfig::default();
        let mut low = passing_input();
        low.score = 76.0;
        let low_result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &low, 0, 10_000, 5);
        assert!(low_result.overall_pass);

        let mut higher = low;
        higher.score = 90.0;
        let higher_result = cascade(&guards).evaluate(Symbol::parse("BTC-USD").unwrap(), &higher, 0, 10_000, 5);
        assert!(higher_result.overall_pass, "raising score must not turn a pass into a fail");
    }
}
