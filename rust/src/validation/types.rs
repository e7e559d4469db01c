//! Finding types produced by the validators.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::EntityType;

/// Row index used for findings about a whole table.
pub const DATASET_ROW: i64 = -1;

/// Hard errors block allocation readiness; warnings do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub id: String,
    pub entity_type: EntityType,
    /// 0-based row, or [`DATASET_ROW`].
    pub row_index: i64,
    pub field: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    fn new(
        severity: Severity,
        entity_type: EntityType,
        row_index: i64,
        field: &str,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        let row_label = if row_index == DATASET_ROW {
            "dataset".to_string()
        } else {
            row_index.to_string()
        };
        Self {
            id: format!("{}:{}:{}", entity_type, row_label, field),
            entity_type,
            row_index,
            field: field.to_string(),
            message: message.into(),
            severity,
            suggestion: Some(suggestion.into()),
        }
    }

    pub fn error(
        entity_type: EntityType,
        row_index: i64,
        field: &str,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(
            Severity::Error,
            entity_type,
            row_index,
            field,
            message,
            suggestion,
        )
    }

    pub fn warning(
        entity_type: EntityType,
        row_index: i64,
        field: &str,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(
            Severity::Warning,
            entity_type,
            row_index,
            field,
            message,
            suggestion,
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Suffix each id with its ordinal among findings sharing entity, row and field.
///
/// Run once over a complete, ordered finding list.
pub(crate) fn assign_ordinals(findings: &mut [ValidationError]) {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    for finding in findings.iter_mut() {
        let ordinal = seen.entry(finding.id.clone()).or_insert(0);
        finding.id = format!("{}:{}", finding.id, ordinal);
        *ordinal += 1;
    }
}

/// Flat finding list with summary accessors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new(findings: Vec<ValidationError>) -> Self {
        Self { findings }
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.error_count()
    }

    /// No hard errors anywhere; warnings are allowed.
    pub fn is_allocation_ready(&self) -> bool {
        self.error_count() == 0
    }

    pub fn by_entity(&self, entity_type: EntityType) -> Vec<&ValidationError> {
        self.findings
            .iter()
            .filter(|f| f.entity_type == entity_type)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_deterministic() {
        let a = ValidationError::error(EntityType::Clients, 2, "ClientName", "m", "s");
        let b = ValidationError::error(EntityType::Clients, 2, "ClientName", "m", "s");
        assert_eq!(a.id, "clients:2:ClientName");
        assert_eq!(a, b);

        let d = ValidationError::error(EntityType::Tasks, DATASET_ROW, "TaskID", "m", "s");
        assert_eq!(d.id, "tasks:dataset:TaskID");
    }

    #[test]
    fn test_assign_ordinals_separates_shared_keys() {
        let mut findings = vec![
            ValidationError::error(EntityType::Workers, 0, "AvailableSlots", "m", "s"),
            ValidationError::warning(EntityType::Workers, 0, "AvailableSlots", "m", "s"),
            ValidationError::error(EntityType::Workers, 1, "AvailableSlots", "m", "s"),
        ];
        assign_ordinals(&mut findings);
        let ids: Vec<&str> = findings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "workers:0:AvailableSlots:0",
                "workers:0:AvailableSlots:1",
                "workers:1:AvailableSlots:0",
            ]
        );
    }

    #[test]
    fn test_report_counts() {
        let report = ValidationReport::new(vec![
            ValidationError::error(EntityType::Workers, 0, "WorkerID", "m", "s"),
            ValidationError::warning(EntityType::Workers, 0, "MaxLoadPerPhase", "m", "s"),
            ValidationError::warning(EntityType::Tasks, 1, "RequiredSkills", "m", "s"),
        ]);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 2);
        assert!(!report.is_allocation_ready());
        assert_eq!(report.by_entity(EntityType::Workers).len(), 2);
    }

    #[test]
    fn test_warnings_only_is_ready() {
        let report = ValidationReport::new(vec![ValidationError::warning(
            EntityType::Clients,
            0,
            "RequestedTaskIDs",
            "m",
            "s",
        )]);
        assert!(report.is_allocation_ready());
    }

    #[test]
    fn test_serialized_shape() {
        let finding = ValidationError::warning(EntityType::Clients, 3, "RequestedTaskIDs", "m", "s");
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["entityType"], "clients");
        assert_eq!(value["rowIndex"], 3);
        assert_eq!(value["severity"], "warning");
    }
}
