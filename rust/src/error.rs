//! Error type for the fallible operations around the engine.
//!
//! Validation and mining never fail; these cover session edits, rule
//! authoring, natural-language parsing and export.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Recommendation not found: {0}")]
    RecommendationNotFound(String),
    #[error("Rule not found: {0}")]
    RuleNotFound(String),
    #[error("Prioritization profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Criterion not found: {0}")]
    CriterionNotFound(String),
    #[error("Weight must be within 0..=1, got {0}")]
    InvalidWeight(f64),
    #[error("Invalid rule: {0}")]
    InvalidRule(String),
    #[error("Could not recognize a rule in: {0:?}")]
    UnrecognizedRule(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PrepError::RuleNotFound("rule_1".to_string());
        assert_eq!(err.to_string(), "Rule not found: rule_1");

        let err = PrepError::InvalidWeight(1.5);
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PrepError = parse_err.into();
        assert!(matches!(err, PrepError::Serialization(_)));
    }
}
