//! Session configuration
//!
//! Tunable parameters of a quiz session, validated with `garde` before a
//! session controller accepts them.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Parameters shared by every round of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of questions fetched for each round
    #[garde(range(
        min = constants::round::MIN_QUESTION_COUNT,
        max = constants::round::MAX_QUESTION_COUNT
    ))]
    pub question_count: usize,
    /// Days a player identity is remembered after it is first stored
    #[garde(range(min = 1, max = constants::identity::MAX_TTL_DAYS))]
    pub identity_ttl_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            question_count: constants::round::DEFAULT_QUESTION_COUNT,
            identity_ttl_days: constants::identity::DEFAULT_TTL_DAYS,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.question_count, 10);
        assert_eq!(config.identity_ttl_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_question_count_bounds() {
        let mut config = SessionConfig::default();
        config.question_count = 0;
        assert!(config.validate().is_err());

        config.question_count = constants::round::MAX_QUESTION_COUNT + 1;
        assert!(config.validate().is_err());

        config.question_count = constants::round::MAX_QUESTION_COUNT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_bounds() {
        let mut config = SessionConfig::default();
        config.identity_ttl_days = 0;
        assert!(config.validate().is_err());

        config.identity_ttl_days = constants::identity::MAX_TTL_DAYS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"question_count": 5}"#).unwrap();
        assert_eq!(config.question_count, 5);
        assert_eq!(config.identity_ttl_days, 7);
    }
}
