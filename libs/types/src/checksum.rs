//! Envelope checksum: SHA-256 over `venue|symbol|ts|value|unit`.
//!
//! Deterministic for identical inputs (Testable Property: round-trip);
//! changing any one field changes the digest.

use sha2::{Digest, Sha256};

pub fn envelope_checksum(venue: &str, symbol: &str, ts_ms: i64, value: &str, unit: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(venue.as_bytes());
    hasher.update(b"|");
    hasher.update(symbol.as_bytes());
    hasher.update(b"|");
    hasher.update(ts_ms.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(value.as_bytes());
    hasher.update(b"|");
    hasher.update(unit.as_bytes());
    hex::encode(hasher.finalize())
}
