//! Whole-dataset checks: duplicate IDs, task references, skill coverage.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::fields::{split_list, split_tags};
use crate::models::{Dataset, EntityType, Record};

use super::types::{ValidationError, DATASET_ROW};

/// IDs that occur more than once, in order of first repetition, each reported once.
///
/// Blank IDs are left to the required-field check.
pub fn duplicate_ids<R: Record>(records: &[R]) -> Vec<String> {
    let mut first_seen: FxHashMap<&str, usize> = FxHashMap::default();
    let mut reported: FxHashSet<&str> = FxHashSet::default();
    let mut duplicates: Vec<String> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let id = record.id().trim();
        if id.is_empty() {
            continue;
        }
        let first = *first_seen.entry(id).or_insert(index);
        if first != index && reported.insert(id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}

fn check_duplicates<R: Record>(records: &[R], out: &mut Vec<ValidationError>) {
    let duplicates = duplicate_ids(records);
    if duplicates.is_empty() {
        return;
    }
    let id_field = R::ENTITY.id_field();
    out.push(ValidationError::error(
        R::ENTITY,
        DATASET_ROW,
        id_field,
        format!("Duplicate {}s found: {}", id_field, duplicates.join(", ")),
        format!("Ensure all {}s are unique", id_field),
    ));
}

fn check_task_references(dataset: &Dataset<'_>, out: &mut Vec<ValidationError>) {
    let known: FxHashSet<&str> = dataset.tasks.iter().map(|t| t.task_id.trim()).collect();

    for (row, client) in dataset.clients.iter().enumerate() {
        let missing: Vec<String> = split_list(&client.requested_task_ids)
            .into_iter()
            .filter(|id| !known.contains(id.as_str()))
            .collect();
        if missing.is_empty() {
            continue;
        }
        out.push(ValidationError::warning(
            EntityType::Clients,
            row as i64,
            "RequestedTaskIDs",
            format!("Referenced task IDs not found: {}", missing.join(", ")),
            "Remove the unknown task IDs or add the referenced tasks",
        ));
    }
}

fn check_skill_coverage(dataset: &Dataset<'_>, out: &mut Vec<ValidationError>) {
    // Nothing to cover against until workers are loaded
    if dataset.workers.is_empty() {
        return;
    }
    let offered: FxHashSet<String> = dataset
        .workers
        .iter()
        .flat_map(|w| split_tags(&w.skills))
        .collect();

    for (row, task) in dataset.tasks.iter().enumerate() {
        let uncovered: Vec<String> = split_tags(&task.required_skills)
            .into_iter()
            .filter(|skill| !offered.contains(skill))
            .collect();
        if uncovered.is_empty() {
            continue;
        }
        out.push(ValidationError::warning(
            EntityType::Tasks,
            row as i64,
            "RequiredSkills",
            format!("No workers have required skills: {}", uncovered.join(", ")),
            "Add workers with these skills or relax the skill requirements",
        ));
    }
}

/// Run every cross-table check.
pub fn validate_cross_references(dataset: &Dataset<'_>) -> Vec<ValidationError> {
    let mut out = Vec::new();
    check_task_references(dataset, &mut out);
    check_skill_coverage(dataset, &mut out);
    check_duplicates(dataset.clients, &mut out);
    check_duplicates(dataset.workers, &mut out);
    check_duplicates(dataset.tasks, &mut out);
    out
}
