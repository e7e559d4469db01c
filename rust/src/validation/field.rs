//! Per-record checks: required fields, numeric ranges, encoded sub-fields.
//!
//! Each function looks at one record in isolation. Anything that needs the
//! other tables lives in [`super::cross_reference`].

use crate::fields::{check_attributes, decode_phase_list, PhaseListError};
use crate::models::{Client, EntityType, Task, Worker};

use super::types::ValidationError;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(
    out: &mut Vec<ValidationError>,
    entity: EntityType,
    row: i64,
    field: &str,
    value: &str,
    suggestion: &str,
) {
    if is_blank(value) {
        out.push(ValidationError::error(
            entity,
            row,
            field,
            format!("{} is required", field),
            suggestion,
        ));
    }
}

fn at_least_one(
    out: &mut Vec<ValidationError>,
    entity: EntityType,
    row: i64,
    field: &str,
    value: i64,
    suggestion: &str,
) {
    if value < 1 {
        out.push(ValidationError::error(
            entity,
            row,
            field,
            format!("{} must be at least 1 (got {})", field, value),
            suggestion,
        ));
    }
}

/// Check a phase-list cell; returns the array length when it decoded as an array.
fn check_phase_list(
    out: &mut Vec<ValidationError>,
    entity: EntityType,
    row: i64,
    field: &str,
    raw: &str,
) -> Option<usize> {
    match decode_phase_list(raw) {
        Ok(phases) => Some(phases.len()),
        Err(err @ PhaseListError::InvalidEntries { .. }) => {
            out.push(ValidationError::error(
                entity,
                row,
                field,
                format!("{} must contain only positive integers ({})", field, err),
                "Use positive whole phase numbers, e.g. [1,2,3]",
            ));
            err.array_len()
        }
        Err(err) => {
            out.push(ValidationError::error(
                entity,
                row,
                field,
                format!("{} must be a valid JSON array ({})", field, err),
                "Format as a JSON array, e.g. [1,2,3,4]",
            ));
            None
        }
    }
}

/// Field checks for one client row.
pub fn validate_client(client: &Client, row: usize) -> Vec<ValidationError> {
    let row = row as i64;
    let entity = EntityType::Clients;
    let mut out = Vec::new();

    require(
        &mut out,
        entity,
        row,
        "ClientID",
        &client.client_id,
        "Provide a unique identifier for the client",
    );
    require(
        &mut out,
        entity,
        row,
        "ClientName",
        &client.client_name,
        "Provide a descriptive name for the client",
    );

    if !(1..=5).contains(&client.priority_level) {
        out.push(ValidationError::error(
            entity,
            row,
            "PriorityLevel",
            format!(
                "PriorityLevel must be between 1 and 5 (got {})",
                client.priority_level
            ),
            "Set priority level to a value between 1 (low) and 5 (high)",
        ));
    }

    if !check_attributes(&client.attributes_json) {
        out.push(ValidationError::error(
            entity,
            row,
            "AttributesJSON",
            "AttributesJSON contains invalid JSON",
            "Fix the JSON syntax, e.g. {\"key\": \"value\"}",
        ));
    }

    out
}

/// Field checks for one worker row.
pub fn validate_worker(worker: &Worker, row: usize) -> Vec<ValidationError> {
    let row = row as i64;
    let entity = EntityType::Workers;
    let mut out = Vec::new();

    require(
        &mut out,
        entity,
        row,
        "WorkerID",
        &worker.worker_id,
        "Provide a unique identifier for the worker",
    );
    require(
        &mut out,
        entity,
        row,
        "WorkerName",
        &worker.worker_name,
        "Provide the worker's name",
    );
    at_least_one(
        &mut out,
        entity,
        row,
        "MaxLoadPerPhase",
        worker.max_load_per_phase,
        "Set a positive maximum workload per phase",
    );

    // A blank cell carries no slot data to check against
    if is_blank(&worker.available_slots) {
        return out;
    }

    if let Some(slot_count) =
        check_phase_list(&mut out, entity, row, "AvailableSlots", &worker.available_slots)
    {
        if worker.max_load_per_phase > slot_count as i64 {
            out.push(ValidationError::warning(
                entity,
                row,
                "MaxLoadPerPhase",
                format!(
                    "MaxLoadPerPhase ({}) exceeds the number of available slots ({})",
                    worker.max_load_per_phase, slot_count
                ),
                format!(
                    "Reduce MaxLoadPerPhase to {} or add more available slots",
                    slot_count
                ),
            ));
        }
    }

    out
}

/// Field checks for one task row.
pub fn validate_task(task: &Task, row: usize) -> Vec<ValidationError> {
    let row = row as i64;
    let entity = EntityType::Tasks;
    let mut out = Vec::new();

    require(
        &mut out,
        entity,
        row,
        "TaskID",
        &task.task_id,
        "Provide a unique identifier for the task",
    );
    require(
        &mut out,
        entity,
        row,
        "TaskName",
        &task.task_name,
        "Provide a descriptive name for the task",
    );
    at_least_one(
        &mut out,
        entity,
        row,
        "Duration",
        task.duration,
        "Set the duration to a positive number of phases",
    );
    at_least_one(
        &mut out,
        entity,
        row,
        "MaxConcurrent",
        task.max_concurrent,
        "Set the maximum concurrent assignments to a positive number",
    );

    if !is_blank(&task.preferred_phases) {
        check_phase_list(&mut out, entity, row, "PreferredPhases", &task.preferred_phases);
    }

    out
}
