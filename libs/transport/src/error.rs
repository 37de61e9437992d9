//! Transport-layer errors, one variant per §7 kind the transport crate can
//! actually raise (teacher's `services/adapters/src/error.rs` one-enum-per-
//! boundary convention).

use cryptorun_types::{CoreError, ErrorKind, VenueId};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TransportError {
    #[error("rate limited on {venue}")]
    RateLimited { venue: VenueId },

    #[error("daily budget exhausted for {venue}, resets at {reset_at_ms}")]
    BudgetExhausted { venue: VenueId, reset_at_ms: i64 },

    #[error("circuit open for {venue}")]
    CircuitOpen { venue: VenueId },

    #[error("request to {venue} timed out")]
    Timeout { venue: VenueId },

    #[error("upstream error from {venue}: {message}")]
    Upstream { venue: VenueId, message: String },
}

impl From<TransportError> for CoreError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::RateLimited { venue } => {
                CoreError::with_venue(ErrorKind::RateLimited, venue, err.to_string())
            }
            TransportError::BudgetExhausted { venue, .. } => {
                CoreError::with_venue(ErrorKind::BudgetExhausted, venue, err.to_string())
            }
            TransportError::CircuitOpen { venue } => {
                CoreError::with_venue(ErrorKind::CircuitOpen, venue, err.to_string())
            }
            TransportError::Timeout { venue } => {
                CoreError::with_venue(ErrorKind::Timeout, venue, err.to_string())
            }
            TransportError::Upstream { venue, message } => {
                CoreError::with_venue(ErrorKind::Upstream, venue, message)
            }
        }
    }
}
