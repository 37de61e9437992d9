//! Centralized, validated configuration for CryptoRun.
//!
//! Every value a reviewer might otherwise expect to find hard-coded near its
//! use site — regime weight buckets, guard profiles, quality thresholds —
//! lives here instead, validated eagerly at load time.

pub mod constants;
pub mod guards;
pub mod loader;
pub mod quality;
pub mod regime_weights;

pub use guards::{FatigueGuardConfig, FreshnessGuardConfig, FreshnessProfile, GuardsConfig, LateFillGuardConfig};
pub use loader::{load, AppConfig, LoadError};
pub use quality::QualityPoliciesConfig;
pub use regime_weights::{ConfigError, RegimeWeights, RegimeWeightsConfig};
