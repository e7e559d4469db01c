//! Validation of the three ingested tables.
//!
//! Field checks run row by row; cross-reference checks run over the whole
//! dataset. Neither ever fails: every problem becomes a [`ValidationError`].

mod cross_reference;
mod field;
mod types;

pub use cross_reference::{duplicate_ids, validate_cross_references};
pub use field::{validate_client, validate_task, validate_worker};
pub use types::{Severity, ValidationError, ValidationReport, DATASET_ROW};

use crate::config::ValidationConfig;
use crate::models::{Client, Dataset, Task, Worker};
use crate::{log_changes, log_checks};

/// Validate with default configuration.
pub fn validate(clients: &[Client], workers: &[Worker], tasks: &[Task]) -> Vec<ValidationError> {
    validate_with(
        &Dataset::new(clients, workers, tasks),
        &ValidationConfig::default(),
    )
}

/// Run field and cross-reference validation.
///
/// Output is grouped by entity type (clients, workers, tasks) and then by row,
/// dataset-level findings first; order within a row follows check order.
pub fn validate_with(dataset: &Dataset<'_>, config: &ValidationConfig) -> Vec<ValidationError> {
    let verbosity = config.verbosity;
    let mut findings: Vec<ValidationError> = Vec::new();

    for (row, client) in dataset.clients.iter().enumerate() {
        findings.extend(validate_client(client, row));
    }
    for (row, worker) in dataset.workers.iter().enumerate() {
        findings.extend(validate_worker(worker, row));
    }
    for (row, task) in dataset.tasks.iter().enumerate() {
        findings.extend(validate_task(task, row));
    }
    let field_count = findings.len();
    log_checks!(verbosity, "Field validation produced {} findings", field_count);

    findings.extend(validate_cross_references(dataset));
    log_checks!(
        verbosity,
        "Cross-reference validation produced {} findings",
        findings.len() - field_count
    );

    // Stable: keeps check order inside one row
    findings.sort_by_key(|f| (f.entity_type, f.row_index));
    types::assign_ordinals(&mut findings);

    let errors = findings.iter().filter(|f| f.is_error()).count();
    log_changes!(
        verbosity,
        "Validated {} clients, {} workers, {} tasks: {} errors, {} warnings",
        dataset.clients.len(),
        dataset.workers.len(),
        dataset.tasks.len(),
        errors,
        findings.len() - errors
    );

    findings
}

/// Validate and wrap the findings in a [`ValidationReport`].
pub fn validation_report(dataset: &Dataset<'_>, config: &ValidationConfig) -> ValidationReport {
    ValidationReport::new(validate_with(dataset, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;

    fn make_client(id: &str, priority: i64, requested: &str) -> Client {
        Client {
            client_id: id.to_string(),
            client_name: id.to_string(),
            priority_level: priority,
            requested_task_ids: requested.to_string(),
            ..Client::default()
        }
    }

    fn make_worker(id: &str, skills: &str, slots: &str, max_load: i64) -> Worker {
        Worker {
            worker_id: id.to_string(),
            worker_name: id.to_string(),
            skills: skills.to_string(),
            available_slots: slots.to_string(),
            max_load_per_phase: max_load,
            ..Worker::default()
        }
    }

    fn make_task(id: &str, skills: &str) -> Task {
        Task {
            task_id: id.to_string(),
            task_name: id.to_string(),
            required_skills: skills.to_string(),
            preferred_phases: "[1,2]".to_string(),
            ..Task::default()
        }
    }

    #[test]
    fn test_clean_dataset() {
        let clients = vec![make_client("C1", 3, "T1")];
        let workers = vec![make_worker("W1", "rust", "[1,2]", 1)];
        let tasks = vec![make_task("T1", "rust")];
        assert!(validate(&clients, &workers, &tasks).is_empty());
    }

    #[test]
    fn test_priority_error_exactly_once() {
        let clients = vec![make_client("C1", 9, "")];
        let findings = validate(&clients, &[], &[]);
        let priority: Vec<_> = findings
            .iter()
            .filter(|f| f.field == "PriorityLevel")
            .collect();
        assert_eq!(priority.len(), 1);
        assert_eq!(priority[0].severity, Severity::Error);
    }

    #[test]
    fn test_grouped_by_entity_and_row() {
        let clients = vec![
            make_client("C1", 0, ""),
            make_client("C1", 3, "T404"),
        ];
        let workers = vec![make_worker("", "go", "[1]", 4)];
        let tasks = vec![make_task("T1", "rust")];
        let findings = validate(&clients, &workers, &tasks);

        let keys: Vec<(EntityType, i64, &str)> = findings
            .iter()
            .map(|f| (f.entity_type, f.row_index, f.field.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (EntityType::Clients, -1, "ClientID"),
                (EntityType::Clients, 0, "PriorityLevel"),
                (EntityType::Clients, 1, "RequestedTaskIDs"),
                (EntityType::Workers, 0, "WorkerID"),
                (EntityType::Workers, 0, "WorkerName"),
                (EntityType::Workers, 0, "MaxLoadPerPhase"),
                (EntityType::Tasks, 0, "RequiredSkills"),
            ]
        );
    }

    #[test]
    fn test_report_readiness() {
        let clients = vec![make_client("C1", 3, "T404")];
        let report = validation_report(
            &Dataset::new(&clients, &[], &[]),
            &ValidationConfig::default(),
        );
        assert_eq!(report.warning_count(), 1);
        assert!(report.is_allocation_ready());
    }
}
