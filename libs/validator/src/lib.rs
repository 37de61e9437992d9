//! Rolling-window anomaly validation: MAD z-score, volume spike rule,
//! corruption checks, warm-up gating.

pub mod quarantine;
pub mod validator;
pub mod window;

pub use quarantine::{Quarantine, QuarantineReason, Severity};
pub use validator::{Validator, ValidatorConfig};
pub use window::RollingWindow;
