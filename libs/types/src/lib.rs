//! # CryptoRun Unified Types
//!
//! Canonical data model shared by every stage of the scan pipeline: venue
//! adapters produce [`Envelope`]s, the technical factor engine builds
//! [`FactorRow`]s from them, the orthogonalizer and composite scorer turn
//! those into [`CompositeScore`]s, and the entry gate cascade emits
//! [`EntryResult`]s.
//!
//! No module here performs network I/O, caching, or scoring logic itself —
//! this crate is the dependency-light substrate the rest of the workspace
//! builds on, in the same role the teacher's `libs/types` plays for its
//! protocol messages.

pub mod bars;
pub mod checksum;
pub mod entry_result;
pub mod envelope;
pub mod error;
pub mod factor_row;
pub mod orderbook;
pub mod regime;
pub mod score;
pub mod venue;

pub use bars::{MultiTimeframeBars, OhlcvBar, Timeframe};
pub use entry_result::{CandidateState, EntryResult, GateCheck};
pub use envelope::{Envelope, Payload, Provenance, SourceTier};
pub use error::{CoreError, ErrorKind};
pub use factor_row::{FactorRow, MomentumCore, QualityFactors, Residuals, TechnicalFactors, VolumeFactors};
pub use orderbook::{OrderBook, OrderBookLevel};
pub use regime::{Regime, RegimeDetection};
pub use score::{CompositeScore, FactorContribution};
pub use venue::{Symbol, SymbolError, VenueId};

/// Result alias used across crate boundaries that don't need a narrower error type.
pub type Result<T> = std::result::Result<T, CoreError>;
