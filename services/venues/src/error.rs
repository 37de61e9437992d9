use cryptorun_types::{CoreError, ErrorKind, VenueId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VenueError {
    #[error("{venue}: failed to parse {endpoint} response: {message}")]
    Parse { venue: VenueId, endpoint: String, message: String },

    #[error("{venue}: aggregated/composite source '{source}' rejected for microstructure data")]
    AggregatorViolation { venue: VenueId, source: String },

    #[error("{venue}: {endpoint} request timed out")]
    Timeout { venue: VenueId, endpoint: String },

    #[error("{venue}: rate limited on {endpoint}")]
    RateLimited { venue: VenueId, endpoint: String },

    #[error("{venue}: transport error calling {endpoint}: {message}")]
    Transport { venue: VenueId, endpoint: String, message: String },

    #[error("{venue}: unsupported symbol '{symbol}'")]
    UnsupportedSymbol { venue: VenueId, symbol: String },
}

impl VenueError {
    pub fn venue(&self) -> VenueId {
        match self {
            VenueError::Parse { venue, .. }
            | VenueError::AggregatorViolation { venue, .. }
            | VenueError::Timeout { venue, .. }
            | VenueError::RateLimited { venue, .. }
            | VenueError::Transport { venue, .. }
            | VenueError::UnsupportedSymbol { venue, .. } => *venue,
        }
    }
}

impl From<VenueError> for CoreError {
    fn from(err: VenueError) -> Self {
        let kind = match &err {
            VenueError::Parse { .. } => ErrorKind::Parse,
            VenueError::AggregatorViolation { .. } => ErrorKind::AggregatorViolation,
            VenueError::Timeout { .. } => ErrorKind::Timeout,
            VenueError::RateLimited { .. } => ErrorKind::RateLimited,
            VenueError::Transport { .. } => ErrorKind::Timeout,
            VenueError::UnsupportedSymbol { .. } => ErrorKind::Validation,
        };
        CoreError::with_venue(kind, err.venue(), err.to_string())
    }
}
