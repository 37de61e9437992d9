//! Error kinds shared across the scan pipeline.
//!
//! Each downstream crate (`cryptorun-transport`, `cryptorun-facade`, ...)
//! defines its own narrow `thiserror` enum for the errors it can actually
//! produce, following the teacher's `services/adapters/src/error.rs`
//! convention of one enum per boundary. [`CoreError`] is the aggregate used
//! where a caller crosses several boundaries (the scan orchestrator) and
//! just needs the §7 error kind plus a message.

use crate::venue::VenueId;
use thiserror::Error;

/// The error kinds named in spec §7. `GateFail` is included for completeness
/// but is never constructed as an error — failing a gate is a normal,
/// non-error outcome recorded on [`crate::EntryResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    RateLimited,
    BudgetExhausted,
    CircuitOpen,
    Timeout,
    Cancelled,
    Stale,
    AggregatorViolation,
    AnomalyQuarantine,
    Parse,
    InsufficientBars,
    OrthogonalityWarn,
    GateFail,
    /// A venue responded, but with a payload-level error rather than a
    /// transport failure; retrying the same request won't help.
    Upstream,
}

impl ErrorKind {
    /// Whether the transport layer should retry an operation that failed with this kind.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::RateLimited)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::BudgetExhausted => "BUDGET_EXHAUSTED",
            ErrorKind::CircuitOpen => "CIRCUIT_OPEN",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Stale => "STALE",
            ErrorKind::AggregatorViolation => "AGGREGATOR_VIOLATION",
            ErrorKind::AnomalyQuarantine => "ANOMALY_QUARANTINE",
            ErrorKind::Parse => "PARSE",
            ErrorKind::InsufficientBars => "INSUFFICIENT_BARS",
            ErrorKind::OrthogonalityWarn => "ORTHOGONALITY_WARN",
            ErrorKind::GateFail => "GATE_FAIL",
            ErrorKind::Upstream => "UPSTREAM",
        };
        write!(f, "{s}")
    }
}

/// Aggregate error carrying a §7 kind, an optional venue, and a message.
#[derive(Debug, Error, Clone)]
#[error("{kind} ({venue:?}): {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub venue: Option<VenueId>,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            venue: None,
            message: message.into(),
        }
    }

    pub fn with_venue(kind: ErrorKind, venue: VenueId, message: impl Into<String>) -> Self {
        Self {
            kind,
            venue: Some(venue),
            message: message.into(),
        }
    }

    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Stale, message)
    }
}
