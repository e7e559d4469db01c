//! Header mapping: raw spreadsheet rows to typed records.
//!
//! Rows arrive as `(header, cell)` pairs in column order. Each expected column
//! is matched to a header by exact name (case-insensitive) first, then by
//! alias substring. Cells are cleaned into the external encodings the rest of
//! the crate decodes.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::fields::check_attributes;
use crate::models::{EntityType, Record};

/// One raw row: `(header, cell)` pairs in column order.
pub type RawRow = Vec<(String, String)>;

type Aliases = &'static [(&'static str, &'static [&'static str])];

const CLIENT_ALIASES: Aliases = &[
    ("ClientID", &["client_id", "clientid", "id", "client_identifier"]),
    ("ClientName", &["client_name", "clientname", "name", "client"]),
    ("PriorityLevel", &["priority_level", "prioritylevel", "priority", "importance"]),
    ("RequestedTaskIDs", &["requested_task_ids", "requestedtaskids", "tasks", "task_ids"]),
    ("GroupTag", &["group_tag", "grouptag", "group", "tag", "category"]),
    ("AttributesJSON", &["attributes_json", "attributesjson", "attributes", "metadata"]),
];

const WORKER_ALIASES: Aliases = &[
    ("WorkerID", &["worker_id", "workerid", "id", "worker_identifier"]),
    ("WorkerName", &["worker_name", "workername", "name", "worker"]),
    ("Skills", &["skills", "skill_set", "skillset", "capabilities"]),
    ("AvailableSlots", &["available_slots", "availableslots", "slots", "availability"]),
    ("MaxLoadPerPhase", &["max_load_per_phase", "maxloadperphase", "max_load", "capacity"]),
    ("WorkerGroup", &["worker_group", "workergroup", "group", "team"]),
    ("QualificationLevel", &["qualification_level", "qualificationlevel", "qualification", "level"]),
];

const TASK_ALIASES: Aliases = &[
    ("TaskID", &["task_id", "taskid", "id", "task_identifier"]),
    ("TaskName", &["task_name", "taskname", "name", "task"]),
    ("Category", &["category", "type", "task_type", "tasktype"]),
    ("Duration", &["duration", "length", "time_required", "phases"]),
    ("RequiredSkills", &["required_skills", "requiredskills", "skills", "skill_requirements"]),
    ("PreferredPhases", &["preferred_phases", "preferredphases", "phases", "timeline"]),
    ("MaxConcurrent", &["max_concurrent", "maxconcurrent", "concurrent_limit", "parallel"]),
];

fn aliases(entity: EntityType) -> Aliases {
    match entity {
        EntityType::Clients => CLIENT_ALIASES,
        EntityType::Workers => WORKER_ALIASES,
        EntityType::Tasks => TASK_ALIASES,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellKind {
    Integer,
    List,
    Attributes,
    Phases { numeric_only: bool },
    Text,
}

fn cell_kind(field: &str) -> CellKind {
    match field {
        "PriorityLevel" | "Duration" | "MaxLoadPerPhase" | "MaxConcurrent" => CellKind::Integer,
        "RequestedTaskIDs" | "Skills" | "RequiredSkills" => CellKind::List,
        "AttributesJSON" => CellKind::Attributes,
        "AvailableSlots" => CellKind::Phases { numeric_only: true },
        "PreferredPhases" => CellKind::Phases { numeric_only: false },
        _ => CellKind::Text,
    }
}

/// Header chosen for each expected column, in the record's column order.
///
/// Aliases are tried in order, so a specific alias wins over a generic one.
pub fn map_headers(headers: &[&str], entity: EntityType) -> Vec<(&'static str, usize)> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut mapping = Vec::new();
    for (field, candidates) in aliases(entity) {
        let exact = lowered.iter().position(|h| *h == field.to_lowercase());
        let fuzzy = || {
            candidates.iter().find_map(|alias| {
                lowered.iter().position(|h| {
                    !h.is_empty() && (h.contains(alias) || alias.contains(h.as_str()))
                })
            })
        };
        if let Some(column) = exact.or_else(fuzzy) {
            mapping.push((*field, column));
        }
    }
    mapping
}

/// Leading integer of `raw`, 0 when there is none.
fn parse_leading_int(raw: &str) -> i64 {
    let raw = raw.trim();
    let digits_start = usize::from(raw.starts_with(['-', '+']));
    let end = raw[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |i| i + digits_start);
    raw[..end].parse().unwrap_or(0)
}

fn normalize_list(raw: &str) -> String {
    raw.replace([';', '|'], ",")
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",")
}

fn normalize_phases(raw: &str, numeric_only: bool) -> String {
    if raw.is_empty() {
        return "[]".to_string();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Array(_)) => value.to_string(),
        // Valid JSON that is not an array is left for validation to report
        Ok(_) => raw.to_string(),
        Err(_) => {
            let items = raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .filter_map(|item| match item.parse::<i64>() {
                    Ok(n) => Some(Value::from(n)),
                    Err(_) if numeric_only => None,
                    Err(_) => Some(Value::from(item)),
                });
            Value::Array(items.collect()).to_string()
        }
    }
}

fn clean_cell(field: &str, raw: &str) -> Value {
    let raw = raw.trim();
    match cell_kind(field) {
        CellKind::Integer => Value::from(parse_leading_int(raw)),
        CellKind::List => Value::from(normalize_list(raw)),
        CellKind::Attributes if raw.is_empty() => Value::from("{}"),
        CellKind::Attributes if check_attributes(raw) => Value::from(raw),
        CellKind::Attributes => Value::from(Value::from(raw).to_string()),
        CellKind::Phases { numeric_only } => Value::from(normalize_phases(raw, numeric_only)),
        CellKind::Text => Value::from(raw),
    }
}

/// Convert raw rows into records of type `R`.
///
/// Columns with no matching header take the record's defaults.
pub fn map_rows<R: Record + DeserializeOwned>(rows: &[RawRow]) -> Result<Vec<R>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let headers: Vec<&str> = first.iter().map(|(h, _)| h.as_str()).collect();
    let mapping = map_headers(&headers, R::ENTITY);

    rows.iter()
        .map(|row| -> Result<R> {
            let mut object = Map::new();
            for (field, column) in &mapping {
                let Some((_, cell)) = row.get(*column) else {
                    continue;
                };
                object.insert(field.to_string(), clean_cell(field, cell));
            }
            let record: R = serde_json::from_value(Value::Object(object))?;
            Ok(record)
        })
        .collect()
}
