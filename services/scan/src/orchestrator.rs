//! `ScanRun`: universe selection -> bounded-pool per-symbol fetch -> batch
//! residualization -> regime detection -> scoring -> gate cascade ->
//! deterministic ordering -> atomic artifact emission (spec §4.10, §5).

use crate::artifacts::{write_artifacts, LedgerLine, WrittenArtifacts};
use crate::config::{ScanConfigError, ScanRunConfig, UniverseConfig};
use crate::context::ScanContext;
use crate::metrics::ScanMetrics;
use crate::pipeline::{build_raw_row, PipelineError, RawRow};
use crate::pool::AdaptivePool;
use crate::signals::{FundingOiSource, NeutralFundingOiSource};
use chrono::Utc;
use cryptorun_config::AppConfig;
use cryptorun_facade::{DataFacade, TieredCacheConfig};
use cryptorun_factors::FactorEngine;
use cryptorun_gates::{GateCascade, GateInput};
use cryptorun_orthogonal::Orthogonalizer;
use cryptorun_regime::indicators::RegimeIndicators;
use cryptorun_regime::RegimeDetector;
use cryptorun_scorer::CompositeScorer;
use cryptorun_types::{FactorRow, Regime, Symbol};
use cryptorun_validator::{Validator, ValidatorConfig};
use cryptorun_venues::{VenueAdapter, VenueRegistry};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("universe config error: {0}")]
    Config(#[from] ScanConfigError),
    #[error("universe is empty, nothing to scan")]
    EmptyUniverse,
    #[error("no venue adapter available: {0}")]
    Venue(#[from] cryptorun_venues::VenueError),
    #[error("failed to write artifacts: {0}")]
    Artifacts(#[from] crate::artifacts::ArtifactError),
}

/// Carries the previous regime classification and when it was last
/// computed across successive `execute()` calls on the same `ScanRun`, so
/// the 4-hour cadence and previous-regime tie-break (spec §4.7) apply to
/// the running system rather than resetting every scan.
struct RegimeState {
    previous: Regime,
    last_detected_at_ms: Option<i64>,
}

impl Default for RegimeState {
    fn default() -> Self {
        Self { previous: Regime::Normal, last_detected_at_ms: None }
    }
}

pub struct ScanRun {
    run_config: ScanRunConfig,
    app_config: AppConfig,
    registry: Arc<VenueRegistry>,
    facade: DataFacade,
    factor_engine: FactorEngine,
    funding_oi: Arc<dyn FundingOiSource>,
    pool: AdaptivePool,
    regime_state: Mutex<RegimeState>,
    validator: Mutex<Validator>,
}

impl ScanRun {
    pub fn new(run_config: ScanRunConfig, app_config: AppConfig, registry: Arc<VenueRegistry>) -> Self {
        Self {
            run_config,
            app_config,
            registry,
            facade: DataFacade::new(TieredCacheConfig::default()),
            factor_engine: FactorEngine::new(Default::default()),
            funding_oi: Arc::new(NeutralFundingOiSource),
            pool: AdaptivePool::new(4, 32),
            regime_state: Mutex::new(RegimeState::default()),
            validator: Mutex::new(Validator::new(ValidatorConfig::default())),
        }
    }

    pub fn with_funding_oi_source(mut self, source: Arc<dyn FundingOiSource>) -> Self {
        self.funding_oi = source;
        self
    }

    pub async fn execute(&self, now_ms: i64) -> Result<(WrittenArtifacts, ScanMetrics), ScanError> {
        let started = std::time::Instant::now();
        let run_id = format!("scan-{}-{}", self.run_config.exchange.as_str(), now_ms);
        let ctx = ScanContext::new(run_id.clone(), now_ms, self.run_config.global_timeout_secs);

        let universe = UniverseConfig::load(&self.run_config.config_dir)?;
        let symbols = universe.symbols()?;
        if symbols.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }

        let adapter = self.registry.get(self.run_config.exchange)?.clone();
        info!(exchange = %self.run_config.exchange, universe_size = symbols.len(), run_id = %run_id, "scan started");

        let mut metrics = ScanMetrics { universe_size: symbols.len(), ..Default::default() };

        // Fires `ctx.cancellation` once the global timeout elapses, so every
        // in-flight `fetch_book`/`get_multi_timeframe_bars` future observes
        // `is_cancelled()` and unwinds cooperatively instead of the scan
        // hanging past its deadline (spec §5).
        let watchdog_ctx = ctx.clone();
        let watchdog_secs = self.run_config.global_timeout_secs;
        let watchdog = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(watchdog_secs)).await;
            watchdog_ctx.cancellation.cancel();
        });

        let raw_rows = self.fetch_all(&adapter, &symbols, now_ms, &ctx, &mut metrics).await;
        watchdog.abort();

        let mut rows: Vec<FactorRow> = raw_rows.iter().map(|r| r.row.clone()).collect();
        metrics.rows_built = rows.len();
        metrics.rows_invalid = rows.iter().filter(|r| !r.valid).count();

        let orthogonalizer = Orthogonalizer::new(Default::default());
        orthogonalizer.residualize(&mut rows);
        for (raw, residualized) in raw_rows.iter().zip(rows.iter()) {
            debug_assert_eq!(raw.row.symbol, residualized.symbol);
        }

        let regime = self.detect_regime(&rows, now_ms);
        info!(?regime, "regime detected for this scan cycle");

        let scorer = CompositeScorer::new(&self.app_config.regime_weights);
        let cascade = GateCascade::new(&self.app_config.guards);

        let mut candidates = Vec::with_capacity(rows.len());
        let mut ledger = Vec::with_capacity(rows.len());

        for (raw, row) in raw_rows.iter().zip(rows.iter()) {
            if !row.valid {
                continue;
            }
            let score = scorer.score(row, regime);
            ledger.push(LedgerLine::from_score(&score));

            let funding_oi = self.funding_oi.snapshot(self.run_config.exchange, &row.symbol).await;
            let gate_input = GateInput {
                score: score.score,
                regime,
                move_24h_pct: raw.move_24h_pct,
                adv_usd: raw.adv_usd,
                spread_bps: row.quality.spread_bps,
                depth_usd_pm2: row.quality.depth_usd_pm2,
                vadr: row.volume.vadr,
                adx: row.technical.adx,
                hurst: row.technical.hurst,
                funding_z_score: funding_oi.funding_z_score,
                funding_cross_venue_divergence: funding_oi.funding_cross_venue_divergence,
                oi_residual_usd: funding_oi.oi_residual_usd,
                bars_age: raw.bars_age,
                price_move_abs: raw.move_24h_pct.abs(),
                atr_1h: row.momentum_core.atr_1h,
                rsi_4h: row.technical.rsi,
                accel_4h_pct: row.momentum_core.accel_4h,
                fill_delay_secs: 0,
            };

            let eval_start = std::time::Instant::now();
            let mut result = cascade.evaluate(row.symbol.clone(), &gate_input, now_ms, now_ms, 0);
            result.evaluation_ms = eval_start.elapsed().as_millis() as u64;

            if result.overall_pass {
                metrics.candidates_passed += 1;
            } else {
                metrics.candidates_failed += 1;
            }
            candidates.push(result);
        }

        candidates.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.symbol.as_str().cmp(b.symbol.as_str()))
        });

        metrics.duration_ms = started.elapsed().as_millis() as u64;

        let written = write_artifacts(&self.run_config.out_dir, &run_id, &candidates, &ledger, Utc::now())?;
        info!(
            passed = metrics.candidates_passed,
            failed = metrics.candidates_failed,
            duration_ms = metrics.duration_ms,
            "scan complete"
        );
        Ok((written, metrics))
    }

    /// Runs one `build_raw_row` future per symbol through `FuturesUnordered`,
    /// each gated by the adaptive pool's semaphore, so up to `pool`'s current
    /// size run concurrently rather than one-symbol-at-a-time.
    async fn fetch_all(
        &self,
        adapter: &Arc<dyn VenueAdapter>,
        symbols: &[Symbol],
        now_ms: i64,
        ctx: &ScanContext,
        metrics: &mut ScanMetrics,
    ) -> Vec<RawRow> {
        use futures::stream::{FuturesUnordered, StreamExt};

        let mut in_flight: FuturesUnordered<_> = symbols
            .iter()
            .map(|symbol| {
                let symbol = symbol.clone();
                let adapter = adapter.clone();
                let ctx = ctx.clone();
                async move {
                    let permit = self.pool.acquire().await;
                    let result = build_raw_row(
                        &self.facade,
                        &adapter,
                        &self.factor_engine,
                        &self.validator,
                        &self.app_config.quality,
                        self.run_config.exchange,
                        &symbol,
                        now_ms,
                        &ctx,
                    )
                    .await;
                    self.pool.release();
                    drop(permit);
                    (symbol, result)
                }
            })
            .collect();

        let mut ticker = tokio::time::interval(AdaptivePool::adjustment_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // first tick fires immediately; the throttle is the interval itself

        let mut rows = Vec::with_capacity(symbols.len());
        loop {
            tokio::select! {
                next = in_flight.next() => {
                    let Some((symbol, result)) = next else { break };
                    match result {
                        Ok(raw) => rows.push(raw),
                        Err(PipelineError::Cancelled { .. }) => {
                            warn!(symbol = %symbol, "scan deadline reached, skipping remaining symbol");
                        }
                        Err(err @ PipelineError::AggregatorRejected { .. }) => {
                            metrics.aggregator_rejections += 1;
                            warn!(symbol = %symbol, error = %err, "symbol dropped: source failed exchange-native guard");
                        }
                        Err(err) => {
                            metrics.symbol_errors += 1;
                            warn!(symbol = %symbol, error = %err, "symbol excluded from this scan");
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.pool.adjust();
                }
            }
        }
        rows
    }

    /// Re-evaluates the regime only once the 4-hour cadence has elapsed
    /// since the last detection; otherwise returns the persisted regime
    /// unchanged, matching `RegimeDetector::is_due`'s contract.
    fn detect_regime(&self, rows: &[FactorRow], now_ms: i64) -> Regime {
        let detector = RegimeDetector::new(Default::default());
        let mut state = self.regime_state.lock();

        if !detector.is_due(state.last_detected_at_ms, now_ms) {
            return state.previous;
        }

        let indicators = universe_indicators(rows);
        let detection = detector.detect(indicators, state.previous, now_ms);
        state.previous = detection.current;
        state.last_detected_at_ms = Some(now_ms);
        detection.current
    }
}

/// Collapses the per-symbol factor rows into the three universe-wide regime
/// indicators (spec §4.7): 7d realized vol from `r7d`, breadth from the
/// fraction with a positive 24h return as a 20-period-MA proxy, and breadth
/// thrust from the universe-average ADX.
fn universe_indicators(rows: &[FactorRow]) -> RegimeIndicators {
    if rows.is_empty() {
        return RegimeIndicators { realized_vol_7d: 0.0, pct_above_20ma: 0.5, breadth_thrust: 0.0 };
    }
    let n = rows.len() as f64;
    let r7d: Vec<f64> = rows.iter().map(|r| r.momentum_core.r7d).collect();
    let mean_r7d = r7d.iter().sum::<f64>() / n;
    let variance = r7d.iter().map(|v| (v - mean_r7d).powi(2)).sum::<f64>() / n;
    let realized_vol_7d = variance.sqrt();

    let above = rows.iter().filter(|r| r.momentum_core.r24h > 0.0).count() as f64;
    let pct_above_20ma = above / n;

    let breadth_thrust = rows.iter().map(|r| r.technical.adx).sum::<f64>() / n;

    RegimeIndicators { realized_vol_7d, pct_above_20ma, breadth_thrust }
}
