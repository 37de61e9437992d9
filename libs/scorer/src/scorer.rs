//! `CompositeScorer`: applies regime weights to residualized factors and
//! adds the capped social contribution (spec §4.8).
//!
//! Weight-bucket mapping (spec §9 Open Questions — resolved, recorded in
//! `DESIGN.md`): `momentum_core` takes the protected momentum composite
//! directly (never residualized); `technical_resid` takes the technical
//! residual; `supply_demand_block` takes the volume residual (surge/VADR is
//! a liquidity supply-demand signal); `catalyst_block` takes the quality
//! residual (microstructure state as the nearest available catalyst proxy,
//! in the absence of a distinct news/catalyst factor in `FactorRow`).

use cryptorun_config::RegimeWeightsConfig;
use cryptorun_orthogonal::{capped_social, momentum_composite};
use cryptorun_types::score::FactorContribution;
use cryptorun_types::{CompositeScore, FactorRow, Regime};
use std::collections::BTreeMap;

pub struct CompositeScorer<'a> {
    weights: &'a RegimeWeightsConfig,
}

impl<'a> CompositeScorer<'a> {
    pub fn new(weights: &'a RegimeWeightsConfig) -> Self {
        Self { weights }
    }

    /// Scores one row. `row.residuals` must be `Some` (i.e. the row has
    /// passed through the orthogonalizer); `row.valid` rows that lack
    /// residuals are a caller error, not handled here.
    pub fn score(&self, row: &FactorRow, regime: Regime) -> CompositeScore {
        let weights = self.weights.for_regime(regime);
        let residuals = row.residuals.unwrap_or_default();

        let momentum_value = momentum_composite(&row.momentum_core);
        let entries = [
            ("momentum_core", weights.momentum_core, momentum_value),
            ("technical_resid", weights.technical_resid, residuals.technical),
            ("supply_demand_block", weights.supply_demand_block, residuals.volume),
            ("catalyst_block", weights.catalyst_block, residuals.quality),
        ];

        let mut contributions = BTreeMap::new();
        let mut weighted_sum = 0.0;
        for (name, weight, value) in entries {
            let contribution = weight * value;
            weighted_sum += contribution;
            contributions.insert(
                name.to_string(),
                FactorContribution { weight, residualized_value: value, contribution },
            );
        }

        let social_raw = row.social_raw.clamp(-CompositeScore::SOCIAL_CAP, CompositeScore::SOCIAL_CAP);
        let social_capped = row.social_raw.abs() > CompositeScore::SOCIAL_CAP;
        let social_contribution = capped_social(row.social_raw);
        debug_assert_eq!(social_raw, social_contribution);

        let score = (weighted_sum + social_contribution).clamp(CompositeScore::MIN, CompositeScore::MAX);

        CompositeScore {
            symbol: row.symbol.clone(),
            score,
            rank: None,
            contributions,
            regime,
            weights: weights.as_map(),
            social_contribution,
            social_capped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptorun_config::RegimeWeights;
    use cryptorun_types::{MomentumCore, QualityFactors, Residuals, Symbol, TechnicalFactors, VolumeFactors};

    fn weights_config() -> RegimeWeightsConfig {
        let w = RegimeWeights { momentum_core: 0.40, technical_resid: 0.30, supply_demand_block: 0.20, catalyst_block: 0.10 };
        RegimeWeightsConfig { calm: w, normal: w, volatile: w, sum_tolerance: None, min_weight: None, max_weight: None }
    }

    fn sample_row() -> FactorRow {
        let mut row = FactorRow::new(Symbol::parse("BTC-USD").unwrap(), 1);
        row.momentum_core = MomentumCore { r1h: 0.01, r4h: 0.02, r12h: 0.03, r24h: 0.04, r7d: 0.05, accel_4h: 0.01, ..Default::default() };
        row.technical = TechnicalFactors::default();
        row.volume = VolumeFactors::default();
        row.quality = QualityFactors::default();
        row.residuals = Some(Residuals { technical: 1.0, volume: 2.0, quality: -1.0, max_off_diagonal_correlation: 0.05 });
        row.social_raw = 3.0;
        row
    }

    #[test]
    fn contributions_sum_to_weighted_portion_of_score() {
        let cfg = weights_config();
        let scorer = CompositeScorer::new(&cfg);
        let score = scorer.score(&sample_row(), Regime::Normal);
        let contribution_sum: f64 = score.contributions.values().map(|c| c.contribution).sum();
        assert!((score.score - (contribution_sum + score.social_contribution)).abs() < 1e-9);
    }

    #[test]
    fn social_never_exceeds_cap() {
        let cfg = weights_config();
        let scorer = CompositeScorer::new(&cfg);
        let mut row = sample_row();
        row.social_raw = 99.0;
        let score = scorer.score(&row, Regime::Normal);
        assert_eq!(score.social_contribution, 10.0);
        assert!(score.social_capped);
    }

    #[test]
    fn score_is_clamped_to_valid_range() {
        let cfg = weights_config();
        let scorer = CompositeScorer::new(&cfg);
        let mut row = sample_row();
        row.residuals = Some(Residuals { technical: 1000.0, volume: 1000.0, quality: 1000.0, max_off_diagonal_correlation: 0.0 });
        let score = scorer.score(&row, Regime::Normal);
        assert!(score.score <= CompositeScore::MAX);
        assert!(score.score >= CompositeScore::MIN);
    }
}
