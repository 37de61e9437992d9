//! [`EntryResult`]: the immutable-after-emission outcome of the gate cascade.

use crate::venue::Symbol;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateState {
    Pending,
    Evaluating,
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCheck {
    pub name: String,
    pub value: f64,
    pub threshold: f64,
    pub passed: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResult {
    pub symbol: Symbol,
    pub overall_pass: bool,
    pub checks: Vec<GateCheck>,
    pub failure_reasons: Vec<String>,
    pub passed_gates: Vec<String>,
    pub evaluation_ms: u64,
    pub timestamp_ms: i64,
    pub state: CandidateState,
}

impl EntryResult {
    pub fn score(&self) -> f64 {
        self.checks
            .iter()
            .find(|c| c.name == "score")
            .map(|c| c.value)
            .unwrap_or(0.0)
    }
}
