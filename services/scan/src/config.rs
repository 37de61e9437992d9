//! Scan-level configuration: the universe to cover and where artifacts land,
//! layered on top of `cryptorun_config::AppConfig` the same way the teacher's
//! strategy binaries resolve a config path then fall back to field defaults.

use cryptorun_types::{Symbol, VenueId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Canonical `BASE-USD` symbols this scan covers.
    pub symbols: Vec<String>,
}

impl UniverseConfig {
    pub fn load(config_dir: &Path) -> Result<Self, ScanConfigError> {
        let path = config_dir.join("universe.yaml");
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| ScanConfigError::Io { path: path.clone(), message: e.to_string() })?;
        serde_yaml::from_str(&raw).map_err(|e| ScanConfigError::Parse { path, message: e.to_string() })
    }

    pub fn symbols(&self) -> Result<Vec<Symbol>, ScanConfigError> {
        self.symbols
            .iter()
            .map(|s| Symbol::parse(s).map_err(|e| ScanConfigError::BadSymbol { symbol: s.clone(), message: e.to_string() }))
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanConfigError {
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("universe contains an invalid symbol '{symbol}': {message}")]
    BadSymbol { symbol: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ScanRunConfig {
    pub exchange: VenueId,
    pub config_dir: PathBuf,
    pub out_dir: PathBuf,
    pub global_timeout_secs: u64,
}

impl ScanRunConfig {
    pub fn new(exchange: VenueId, config_dir: PathBuf, out_dir: PathBuf) -> Self {
        Self { exchange, config_dir, out_dir, global_timeout_secs: 30 * 60 }
    }
}
