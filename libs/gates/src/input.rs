//! `GateInput`: every value the ten-gate cascade needs, gathered by the
//! caller (the scan orchestrator) from the composite score, factor row, and
//! order book/funding/OI envelopes for one symbol.

use cryptorun_types::Regime;

#[derive(Debug, Clone, Copy)]
pub struct GateInput {
    pub score: f64,
    pub regime: Regime,

    pub move_24h_pct: f64,
    pub adv_usd: f64,

    pub spread_bps: f64,
    pub depth_usd_pm2: f64,
    pub vadr: f64,

    pub adx: f64,
    pub hurst: f64,

    pub funding_z_score: f64,
    pub funding_cross_venue_divergence: bool,

    pub oi_residual_usd: f64,

    pub bars_age: u32,
    pub price_move_abs: f64,
    pub atr_1h: f64,

    pub rsi_4h: f64,
    pub accel_4h_pct: f64,

    /// Seconds between signal emission and fill, negative if fill precedes
    /// the signal (always a failure).
    pub fill_delay_secs: i64,
}
