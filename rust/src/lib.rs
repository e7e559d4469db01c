//! Data preparation engine for client/worker/task allocation.
//!
//! Validates the three ingested tables, mines candidate business rules from
//! them, and keeps the rules and prioritization profiles a host session edits.
//! The optional `python` feature exposes the same operations through PyO3.

pub mod logging;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod ingest;
pub mod models;
pub mod nl_rule;
pub mod prioritization;
pub mod query;
pub mod recommend;
pub mod rules;
pub mod session;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use config::{MiningConfig, ValidationConfig};
pub use error::{PrepError, Result};
pub use models::{Client, Dataset, EntityType, Record, Task, Worker};
pub use prioritization::{
    default_profiles, CriterionCategory, PrioritizationCriterion, PrioritizationProfile,
};
pub use query::QueryResult;
pub use recommend::{mine_recommendations, mine_recommendations_with, RuleRecommendation};
pub use rules::{BusinessRule, RuleParameters, RuleSource, RuleType};
pub use session::{RuleUpdate, Session};
pub use validation::{validate, validate_with, Severity, ValidationError, ValidationReport};
