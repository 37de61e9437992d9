//! Constants the spec names explicitly so they are never re-literaled
//! (spec §9 Open Questions).

/// The VADR microstructure gate threshold. The source material carries two
/// overlapping values (1.75 and 1.8); the spec adopts 1.75 and this is the
/// single definition every other crate references.
pub const MICROSTRUCTURE_VADR_MIN: f64 = 1.75;

/// Entry gate: minimum composite score to pass.
pub const SCORE_GATE_MIN: f64 = 75.0;

/// Entry gate: minimum daily USD volume (ADV).
pub const ADV_USD_MIN: f64 = 500_000.0;

/// Entry gate: maximum spread in basis points.
pub const SPREAD_BPS_MAX: f64 = 50.0;

/// Entry gate: minimum ±2% depth in USD.
pub const DEPTH_USD_PM2_MIN: f64 = 100_000.0;

/// Entry gate: ADX threshold for trend strength (alternative to Hurst).
pub const ADX_TREND_MIN: f64 = 25.0;

/// Entry gate: Hurst threshold for trend strength (alternative to ADX).
pub const HURST_TREND_MIN: f64 = 0.55;

/// Entry gate: funding z-score divergence threshold.
pub const FUNDING_Z_MIN: f64 = 2.0;

/// Entry gate: minimum |ΔOI residual| in USD.
pub const OI_RESIDUAL_USD_MIN: f64 = 1_000_000.0;

/// Social contribution hard cap, applied after the weighted sum (§4.8).
pub const SOCIAL_CAP: f64 = 10.0;

/// Composite score clamp bounds (§3 CompositeScore).
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 110.0;

/// Default regime-weight sum tolerance (§4.7 validation).
pub const REGIME_WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Default regime-weight per-bucket bounds (Testable Property 1).
pub const REGIME_WEIGHT_MIN: f64 = 0.05;
pub const REGIME_WEIGHT_MAX: f64 = 0.60;

/// Late-fill guard window, inclusive at both ends (scenario S3).
pub const LATE_FILL_MAX_SECS: i64 = 30;

/// Fatigue guard thresholds (scenario S1, Testable Property 9).
pub const FATIGUE_MOVE_24H_PCT: f64 = 12.0;
pub const FATIGUE_RSI_4H_MIN: f64 = 70.0;
pub const FATIGUE_ACCEL_OVERRIDE_PCT: f64 = 2.0;

/// Freshness guard absolute safety caps — no profile may relax beyond these
/// (spec §4.9).
pub const FRESHNESS_ABSOLUTE_MAX_BARS_AGE: u32 = 5;
pub const FRESHNESS_ABSOLUTE_MIN_ATR_FACTOR: f64 = 0.8;
