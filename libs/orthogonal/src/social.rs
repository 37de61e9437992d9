//! Social contribution: computed independently, never residualized, hard
//! capped at ±10 points before it is added post-normalization (spec §4.6,
//! §4.8).

use cryptorun_types::score::CompositeScore;

/// Clamps a raw social score to `[-SOCIAL_CAP, SOCIAL_CAP]`.
pub fn capped_social(raw: f64) -> f64 {
    raw.clamp(-CompositeScore::SOCIAL_CAP, CompositeScore::SOCIAL_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_positive_and_negative_extremes() {
        assert_eq!(capped_social(25.0), 10.0);
        assert_eq!(capped_social(-25.0), -10.0);
        assert_eq!(capped_social(3.5), 3.5);
    }
}
