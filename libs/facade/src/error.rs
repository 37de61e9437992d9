use cryptorun_types::{CoreError, ErrorKind, Symbol, VenueId};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum FacadeError {
    #[error("no tier satisfies the freshness budget for {venue}/{symbol}")]
    Stale { venue: VenueId, symbol: Symbol },

    #[error("fetch cancelled for {venue}/{symbol}")]
    Cancelled { venue: VenueId, symbol: Symbol },

    #[error("upstream fetch failed for {venue}/{symbol}: {message}")]
    FetchFailed { venue: VenueId, symbol: Symbol, message: String },
}

impl From<FacadeError> for CoreError {
    fn from(err: FacadeError) -> Self {
        match &err {
            FacadeError::Stale { venue, .. } => CoreError::with_venue(ErrorKind::Stale, *venue, err.to_string()),
            FacadeError::Cancelled { venue, .. } => {
                CoreError::with_venue(ErrorKind::Cancelled, *venue, err.to_string())
            }
            FacadeError::FetchFailed { venue, .. } => {
                CoreError::with_venue(ErrorKind::Timeout, *venue, err.to_string())
            }
        }
    }
}
