//! Business rule model.
//!
//! Each rule kind carries its own parameter struct; the serialized form keeps
//! the `{ "type": ..., "parameters": {...} }` shape the export consumers read.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{PrepError, Result};
use crate::models::{EntityType, Record};

/// Discriminant of [`RuleParameters`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    CoRun,
    SlotRestriction,
    LoadLimit,
    PhaseWindow,
    PatternMatch,
    PrecedenceOverride,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoRun => "co-run",
            Self::SlotRestriction => "slot-restriction",
            Self::LoadLimit => "load-limit",
            Self::PhaseWindow => "phase-window",
            Self::PatternMatch => "pattern-match",
            Self::PrecedenceOverride => "precedence-override",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a rule came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSource {
    Manual,
    AiGenerated,
    AiSuggested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Client,
    Worker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternAction {
    Allow,
    Deny,
    Flag,
}

/// Tasks that must be scheduled together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoRunParams {
    pub task_ids: Vec<String>,
    pub must_run_together: bool,
}

/// A client or worker group must share at least `min_common_slots` phases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRestrictionParams {
    pub target_group: String,
    pub group_type: GroupType,
    pub min_common_slots: u32,
    pub phases: Vec<u32>,
}

/// Cap on slots per phase for a worker group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadLimitParams {
    pub worker_group: String,
    pub max_slots_per_phase: u32,
    pub phases: Vec<u32>,
}

/// Phases a task may and may not run in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseWindowParams {
    pub task_id: String,
    pub allowed_phases: Vec<u32>,
    pub restricted_phases: Vec<u32>,
}

/// Regex over one column of one table, with an action for matching rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatchParams {
    pub pattern: String,
    pub field: String,
    pub entity_type: EntityType,
    pub action: PatternAction,
}

impl PatternMatchParams {
    pub fn compile(&self) -> Result<Regex> {
        Ok(Regex::new(&self.pattern)?)
    }

    /// Rows of `records` whose `field` matches the pattern.
    ///
    /// Records of a different table never match.
    pub fn matching_rows<R: Record>(&self, records: &[R]) -> Result<Vec<usize>> {
        if R::ENTITY != self.entity_type {
            return Ok(Vec::new());
        }
        let regex = self.compile()?;
        Ok(records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.field(&self.field).is_some_and(|v| regex.is_match(&v)))
            .map(|(row, _)| row)
            .collect())
    }
}

/// Which of two rules wins when they conflict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecedenceOverrideParams {
    pub global_rule_id: String,
    pub specific_rule_id: String,
    pub priority: i32,
}

/// Parameters, one variant per rule kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "kebab-case")]
pub enum RuleParameters {
    CoRun(CoRunParams),
    SlotRestriction(SlotRestrictionParams),
    LoadLimit(LoadLimitParams),
    PhaseWindow(PhaseWindowParams),
    PatternMatch(PatternMatchParams),
    PrecedenceOverride(PrecedenceOverrideParams),
}

impl RuleParameters {
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::CoRun(_) => RuleType::CoRun,
            Self::SlotRestriction(_) => RuleType::SlotRestriction,
            Self::LoadLimit(_) => RuleType::LoadLimit,
            Self::PhaseWindow(_) => RuleType::PhaseWindow,
            Self::PatternMatch(_) => RuleType::PatternMatch,
            Self::PrecedenceOverride(_) => RuleType::PrecedenceOverride,
        }
    }

    /// Constraints a hand-authored rule can violate.
    pub fn check(&self) -> Result<()> {
        let invalid = |msg: &str| Err(PrepError::InvalidRule(msg.to_string()));
        match self {
            Self::CoRun(p) => {
                let mut ids: Vec<&str> = p.task_ids.iter().map(|s| s.trim()).collect();
                ids.sort_unstable();
                ids.dedup();
                ids.retain(|s| !s.is_empty());
                if ids.len() < 2 {
                    return invalid("co-run needs at least two distinct task IDs");
                }
            }
            Self::SlotRestriction(p) => {
                if p.target_group.trim().is_empty() {
                    return invalid("slot-restriction needs a target group");
                }
                if p.min_common_slots < 1 {
                    return invalid("slot-restriction needs at least one common slot");
                }
            }
            Self::LoadLimit(p) => {
                if p.worker_group.trim().is_empty() {
                    return invalid("load-limit needs a worker group");
                }
                if p.max_slots_per_phase < 1 {
                    return invalid("load-limit needs max slots per phase of at least 1");
                }
            }
            Self::PhaseWindow(p) => {
                if p.task_id.trim().is_empty() {
                    return invalid("phase-window needs a task ID");
                }
                if p.allowed_phases.is_empty() {
                    return invalid("phase-window needs at least one allowed phase");
                }
                if p.allowed_phases.iter().any(|ph| p.restricted_phases.contains(ph)) {
                    return invalid("phase-window allows and restricts the same phase");
                }
            }
            Self::PatternMatch(p) => {
                if p.field.trim().is_empty() {
                    return invalid("pattern-match needs a field");
                }
                p.compile()?;
            }
            Self::PrecedenceOverride(p) => {
                if p.global_rule_id.trim().is_empty() || p.specific_rule_id.trim().is_empty() {
                    return invalid("precedence-override needs two rule IDs");
                }
                if p.global_rule_id == p.specific_rule_id {
                    return invalid("precedence-override needs two different rules");
                }
            }
        }
        Ok(())
    }
}

/// A user-authored or accepted rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRule {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub parameters: RuleParameters,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub source: RuleSource,
}

pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

impl BusinessRule {
    /// Build an enabled rule stamped with a fresh id and the current time.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: RuleParameters,
        source: RuleSource,
    ) -> Self {
        Self {
            id: generate_id("rule"),
            name: name.into(),
            description: description.into(),
            parameters,
            enabled: true,
            created_at: Utc::now(),
            source,
        }
    }

    /// Build a checked `source = manual` rule.
    pub fn manual(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: RuleParameters,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PrepError::InvalidRule("rule name is required".to_string()));
        }
        parameters.check()?;
        Ok(Self::new(name, description, parameters, RuleSource::Manual))
    }

    pub fn rule_type(&self) -> RuleType {
        self.parameters.rule_type()
    }

    pub fn check(&self) -> Result<()> {
        self.parameters.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn co_run(ids: &[&str]) -> RuleParameters {
        RuleParameters::CoRun(CoRunParams {
            task_ids: ids.iter().map(|s| s.to_string()).collect(),
            must_run_together: true,
        })
    }

    #[test]
    fn test_serialized_shape() {
        let rule = BusinessRule::new("Pair", "d", co_run(&["T1", "T2"]), RuleSource::AiGenerated);
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["type"], "co-run");
        assert_eq!(value["parameters"]["taskIds"][1], "T2");
        assert_eq!(value["parameters"]["mustRunTogether"], true);
        assert_eq!(value["source"], "ai-generated");
        assert!(value["createdAt"].is_string());
        assert!(rule.id.starts_with("rule_"));
    }

    #[test]
    fn test_deserialize_from_export_shape() {
        let json = r#"{
            "id": "rule_1", "name": "Cap", "description": "",
            "type": "load-limit",
            "parameters": {"workerGroup": "qa", "maxSlotsPerPhase": 2, "phases": [1, 2]},
            "enabled": false, "createdAt": "2025-01-01T00:00:00Z", "source": "manual"
        }"#;
        let rule: BusinessRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.rule_type(), RuleType::LoadLimit);
        assert!(!rule.enabled);
        match rule.parameters {
            RuleParameters::LoadLimit(p) => assert_eq!(p.max_slots_per_phase, 2),
            other => panic!("unexpected parameters: {:?}", other),
        }
    }

    #[test]
    fn test_co_run_needs_two_distinct_tasks() {
        assert!(co_run(&["T1", "T2"]).check().is_ok());
        assert!(matches!(
            co_run(&["T1", "T1"]).check(),
            Err(PrepError::InvalidRule(_))
        ));
        assert!(co_run(&["T1", " "]).check().is_err());
    }

    #[test]
    fn test_phase_window_overlap_rejected() {
        let params = RuleParameters::PhaseWindow(PhaseWindowParams {
            task_id: "T1".to_string(),
            allowed_phases: vec![1, 2],
            restricted_phases: vec![2],
        });
        assert!(params.check().is_err());
    }

    #[test]
    fn test_pattern_match_bad_regex() {
        let params = RuleParameters::PatternMatch(PatternMatchParams {
            pattern: "([".to_string(),
            field: "TaskID".to_string(),
            entity_type: EntityType::Tasks,
            action: PatternAction::Flag,
        });
        assert!(matches!(params.check(), Err(PrepError::InvalidPattern(_))));
    }

    #[test]
    fn test_pattern_match_rows() {
        let tasks = vec![
            Task {
                task_id: "T1".to_string(),
                category: "ml-training".to_string(),
                ..Task::default()
            },
            Task {
                task_id: "T2".to_string(),
                category: "design".to_string(),
                ..Task::default()
            },
        ];
        let params = PatternMatchParams {
            pattern: "^ml-".to_string(),
            field: "Category".to_string(),
            entity_type: EntityType::Tasks,
            action: PatternAction::Flag,
        };
        assert_eq!(params.matching_rows(&tasks).unwrap(), vec![0]);

        let for_workers = PatternMatchParams {
            entity_type: EntityType::Workers,
            ..params
        };
        assert!(for_workers.matching_rows(&tasks).unwrap().is_empty());
    }

    #[test]
    fn test_manual_rule() {
        let rule = BusinessRule::manual("Pair", "", co_run(&["T1", "T2"])).unwrap();
        assert_eq!(rule.source, RuleSource::Manual);
        assert!(rule.enabled);
        assert!(BusinessRule::manual(" ", "", co_run(&["T1", "T2"])).is_err());
        assert!(BusinessRule::manual("Pair", "", co_run(&["T1"])).is_err());
    }

    #[test]
    fn test_precedence_needs_distinct_rules() {
        let params = RuleParameters::PrecedenceOverride(PrecedenceOverrideParams {
            global_rule_id: "rule_a".to_string(),
            specific_rule_id: "rule_a".to_string(),
            priority: 1,
        });
        assert!(params.check().is_err());
    }
}
