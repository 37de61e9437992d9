//! `Orthogonalizer`: batch Gram-Schmidt residualization over a cross-section
//! of [`FactorRow`]s for one scan cycle.
//!
//! Each "column" here is one scalar per symbol in the batch (matching
//! `vector.rs`'s convention), collapsed from its source `FactorRow` bucket by
//! z-scoring the bucket's sub-fields against the batch and averaging them.
//! The protected momentum-core column is never projected against anything;
//! technical, volume, and quality are each projected onto the orthogonal
//! complement of the protected column and of every column processed before
//! them, in the fixed order technical -> volume -> quality (spec §4.6).

use crate::vector::{correlation, project_out, zscore};
use cryptorun_types::{FactorRow, MomentumCore, Residuals};
use tracing::warn;

/// The protected momentum-core column collapsed to a single scalar: sum of
/// the multi-timeframe log returns plus 4h acceleration. Used both as the
/// column the orthogonalizer projects everything else against and, via the
/// composite scorer, as the `momentum_core` weight bucket's raw input —
/// the "protected" property means it never runs through Gram-Schmidt, not
/// that it is rescaled for scoring.
pub fn momentum_composite(core: &MomentumCore) -> f64 {
    core.r1h + core.r4h + core.r12h + core.r24h + core.r7d + core.accel_4h
}

#[derive(Debug, Clone, Copy)]
pub struct OrthogonalizerConfig {
    /// Pairwise off-diagonal correlation above which a QA warning is
    /// attached to every row in the batch (spec §4.6: default 0.3 for
    /// acceptance, 0.1 "excellent"; failing this does not abort scoring).
    pub qa_threshold: f64,
}

impl Default for OrthogonalizerConfig {
    fn default() -> Self {
        Self { qa_threshold: 0.3 }
    }
}

pub struct Orthogonalizer {
    config: OrthogonalizerConfig,
}

fn momentum_column(rows: &[FactorRow]) -> Vec<f64> {
    let m: Vec<f64> = rows.iter().map(|r| momentum_composite(&r.momentum_core)).collect();
    zscore(&m)
}

fn technical_column(rows: &[FactorRow]) -> Vec<f64> {
    let rsi: Vec<f64> = rows.iter().map(|r| r.technical.rsi).collect();
    let adx: Vec<f64> = rows.iter().map(|r| r.technical.adx).collect();
    let hurst: Vec<f64> = rows.iter().map(|r| r.technical.hurst).collect();
    average_zscored(&[rsi, adx, hurst])
}

fn volume_column(rows: &[FactorRow]) -> Vec<f64> {
    let surge: Vec<f64> = rows.iter().map(|r| r.volume.surge_vs_mean).collect();
    let vadr: Vec<f64> = rows.iter().map(|r| r.volume.vadr).collect();
    average_zscored(&[surge, vadr])
}

fn quality_column(rows: &[FactorRow]) -> Vec<f64> {
    // Wider spread is worse quality; flip its sign so every sub-field in the
    // average points the same direction (higher = better microstructure).
    let inverted_spread: Vec<f64> = rows.iter().map(|r| -r.quality.spread_bps).collect();
    let depth: Vec<f64> = rows.iter().map(|r| r.quality.depth_usd_pm2).collect();
    let imbalance: Vec<f64> = rows.iter().map(|r| r.quality.book_imbalance).collect();
    average_zscored(&[inverted_spread, depth, imbalance])
}

fn average_zscored(columns: &[Vec<f64>]) -> Vec<f64> {
    let n = columns.first().map(|c| c.len()).unwrap_or(0);
    let mut sum = vec![0.0; n];
    for column in columns {
        for (acc, v) in sum.iter_mut().zip(zscore(column)) {
            *acc += v;
        }
    }
    let count = columns.len().max(1) as f64;
    sum.into_iter().map(|v| v / count).collect()
}

impl Orthogonalizer {
    pub fn new(config: OrthogonalizerConfig) -> Self {
        Self { config }
    }

    /// Residualizes `rows` in place. Rows marked invalid are still included
    /// in the cross-section (their columns are well-defined numbers even if
    /// they won't reach scoring) so as not to distort the batch statistics
    /// used by the remaining valid rows.
    pub fn residualize(&self, rows: &mut [FactorRow]) {
        if rows.is_empty() {
            return;
        }

        let protected = momentum_column(rows);
        let technical_resid = project_out(&technical_column(rows), &protected);
        let volume_resid = project_out(&project_out(&volume_column(rows), &protected), &technical_resid);
        let quality_raw = project_out(&project_out(&quality_column(rows), &protected), &technical_resid);
        let quality_resid = project_out(&quality_raw, &volume_resid);

        let pairs = [
            correlation(&protected, &technical_resid).abs(),
            correlation(&protected, &volume_resid).abs(),
            correlation(&protected, &quality_resid).abs(),
            correlation(&technical_resid, &volume_resid).abs(),
            correlation(&technical_resid, &quality_resid).abs(),
            correlation(&volume_resid, &quality_resid).abs(),
        ];
        let max_off_diagonal = pairs.into_iter().fold(0.0_f64, f64::max);

        let warning = if max_off_diagonal > self.config.qa_threshold {
            warn!(max_off_diagonal, threshold = self.config.qa_threshold, "orthogonality QA threshold exceeded");
            Some(format!(
                "ORTHOGONALITY_WARN: max off-diagonal correlation {max_off_diagonal:.4} exceeds QA threshold {:.4}",
                self.config.qa_threshold
            ))
        } else {
            None
        };

        for (i, row) in rows.iter_mut().enumerate() {
            row.residuals = Some(Residuals {
                technical: technical_resid[i],
                volume: volume_resid[i],
                quality: quality_resid[i],
                max_off_diagonal_correlation: max_off_diagonal,
            });
            row.orthogonality_warning = warning.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptorun_types::{MomentumCore, QualityFactors, Symbol, TechnicalFactors, VolumeFactors};

    fn row(symbol: &str, momentum: f64, technical: f64, volume: f64, spread: f64) -> FactorRow {
        let mut r = FactorRow::new(Symbol::parse(symbol).unwrap(), 1);
        r.momentum_core = MomentumCore { r1h: momentum, ..Default::default() };
        r.technical = TechnicalFactors { rsi: technical, adx: technical, hurst: 0.5, atr_pct: 0.0 };
        r.volume = VolumeFactors { surge_vs_mean: volume, vadr: volume };
        r.quality = QualityFactors { spread_bps: spread, depth_usd_pm2: 100_000.0, book_imbalance: 0.0 };
        r
    }

    #[test]
    fn residuals_are_uncorrelated_with_protected_column() {
        let mut rows = vec![
            row("BTC-USD", 1.0, 10.0, 100.0, 5.0),
            row("ETH-USD", 2.0, 50.0, 200.0, 10.0),
            row("SOL-USD", -1.0, 30.0, 50.0, 20.0),
            row("DOGE-USD", 0.5, 70.0, 500.0, 50.0),
            row("AVAX-USD", -2.0, 20.0, 10.0, 15.0),
        ];
        Orthogonalizer::new(OrthogonalizerConfig::default()).residualize(&mut rows);

        let protected = momentum_column(&rows);
        let technical_resid: Vec<f64> = rows.iter().map(|r| r.residuals.unwrap().technical).collect();
        let volume_resid: Vec<f64> = rows.iter().map(|r| r.residuals.unwrap().volume).collect();
        let quality_resid: Vec<f64> = rows.iter().map(|r| r.residuals.unwrap().quality).collect();

        assert!(correlation(&protected, &technical_resid).abs() < 1e-9);
        assert!(correlation(&protected, &volume_resid).abs() < 1e-9);
        assert!(correlation(&protected, &quality_resid).abs() < 1e-9);
    }

    #[test]
    fn every_row_in_batch_receives_same_max_off_diagonal() {
        let mut rows = vec![
            row("BTC-USD", 1.0, 10.0, 100.0, 5.0),
            row("ETH-USD", 2.0, 50.0, 200.0, 10.0),
            row("SOL-USD", -1.0, 30.0, 50.0, 20.0),
        ];
        Orthogonalizer::new(OrthogonalizerConfig::default()).residualize(&mut rows);
        let first = rows[0].residuals.unwrap().max_off_diagonal_correlation;
        assert!(rows.iter().all(|r| r.residuals.unwrap().max_off_diagonal_correlation == first));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut rows: Vec<FactorRow> = Vec::new();
        Orthogonalizer::new(OrthogonalizerConfig::default()).residualize(&mut rows);
        assert!(rows.is_empty());
    }
}
