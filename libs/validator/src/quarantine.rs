//! The validator's in-band outcome type. A quarantine is never an error —
//! per spec §7, it's the normal path for a record that fails anomaly
//! checks; the record simply never progresses to scoring.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarantineReason {
    MadZScoreExceeded,
    SpikeMultipleExceeded,
    NonFiniteValue,
    NonPositivePrice,
    NegativeVolume,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quarantine {
    pub field: String,
    pub reason: QuarantineReason,
    pub severity: Severity,
    pub value: f64,
    pub reference: f64,
}

impl Quarantine {
    pub fn new(field: impl Into<String>, reason: QuarantineReason, severity: Severity, value: f64, reference: f64) -> Self {
        Self { field: field.into(), reason, severity, value, reference }
    }
}
