//! Composite Scorer: regime-weighted residual factors plus capped social
//! contribution, with full per-factor attribution (spec §4.8).

pub mod scorer;

pub use scorer::CompositeScorer;
