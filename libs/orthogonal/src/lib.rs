//! Fixed-order Gram-Schmidt residualization against the protected
//! momentum-core vector (spec §4.6).

pub mod engine;
pub mod social;
pub mod vector;

pub use engine::{momentum_composite, Orthogonalizer, OrthogonalizerConfig};
pub use social::capped_social;
