//! Core record types for the three ingested tables.
//!
//! Records keep the string-encoded sub-fields (comma lists, JSON arrays) exactly
//! as they arrive so export round-trips the ingested format. Everything that
//! reasons about the data decodes through [`crate::fields`] first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which table a record or finding belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Clients,
    Workers,
    Tasks,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Workers => "workers",
            Self::Tasks => "tasks",
        }
    }

    /// Name of the identifier column for this table.
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Clients => "ClientID",
            Self::Workers => "WorkerID",
            Self::Tasks => "TaskID",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform field access over the three record types.
///
/// Field names are the external column headers (`ClientID`, `Skills`, ...).
pub trait Record {
    const ENTITY: EntityType;
    const FIELDS: &'static [&'static str];

    fn id(&self) -> &str;

    /// Cell value rendered as text, or `None` for an unknown column.
    fn field(&self, name: &str) -> Option<String>;
}

/// A client requesting work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Client {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    pub client_name: String,
    pub priority_level: i64,
    /// Comma-separated task IDs.
    #[serde(rename = "RequestedTaskIDs")]
    pub requested_task_ids: String,
    pub group_tag: String,
    /// Free-form JSON object.
    #[serde(rename = "AttributesJSON")]
    pub attributes_json: String,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_name: String::new(),
            priority_level: 1,
            requested_task_ids: String::new(),
            group_tag: "default".to_string(),
            attributes_json: "{}".to_string(),
        }
    }
}

impl Record for Client {
    const ENTITY: EntityType = EntityType::Clients;
    const FIELDS: &'static [&'static str] = &[
        "ClientID",
        "ClientName",
        "PriorityLevel",
        "RequestedTaskIDs",
        "GroupTag",
        "AttributesJSON",
    ];

    fn id(&self) -> &str {
        &self.client_id
    }

    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "ClientID" => self.client_id.clone(),
            "ClientName" => self.client_name.clone(),
            "PriorityLevel" => self.priority_level.to_string(),
            "RequestedTaskIDs" => self.requested_task_ids.clone(),
            "GroupTag" => self.group_tag.clone(),
            "AttributesJSON" => self.attributes_json.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// A worker offering capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Worker {
    #[serde(rename = "WorkerID")]
    pub worker_id: String,
    pub worker_name: String,
    /// Comma-separated lowercase skill tags.
    pub skills: String,
    /// JSON array of phase numbers.
    pub available_slots: String,
    pub max_load_per_phase: i64,
    pub worker_group: String,
    pub qualification_level: String,
}

impl Default for Worker {
    fn default() -> Self {
        Self {
            worker_id: String::new(),
            worker_name: String::new(),
            skills: String::new(),
            available_slots: "[]".to_string(),
            max_load_per_phase: 1,
            worker_group: "default".to_string(),
            qualification_level: "junior".to_string(),
        }
    }
}

impl Record for Worker {
    const ENTITY: EntityType = EntityType::Workers;
    const FIELDS: &'static [&'static str] = &[
        "WorkerID",
        "WorkerName",
        "Skills",
        "AvailableSlots",
        "MaxLoadPerPhase",
        "WorkerGroup",
        "QualificationLevel",
    ];

    fn id(&self) -> &str {
        &self.worker_id
    }

    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "WorkerID" => self.worker_id.clone(),
            "WorkerName" => self.worker_name.clone(),
            "Skills" => self.skills.clone(),
            "AvailableSlots" => self.available_slots.clone(),
            "MaxLoadPerPhase" => self.max_load_per_phase.to_string(),
            "WorkerGroup" => self.worker_group.clone(),
            "QualificationLevel" => self.qualification_level.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// A unit of work to allocate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Task {
    #[serde(rename = "TaskID")]
    pub task_id: String,
    pub task_name: String,
    pub category: String,
    /// Length in phases.
    pub duration: i64,
    /// Comma-separated lowercase skill tags.
    pub required_skills: String,
    /// JSON array of phase numbers.
    pub preferred_phases: String,
    pub max_concurrent: i64,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            task_id: String::new(),
            task_name: String::new(),
            category: "general".to_string(),
            duration: 1,
            required_skills: String::new(),
            preferred_phases: "[]".to_string(),
            max_concurrent: 1,
        }
    }
}

impl Record for Task {
    const ENTITY: EntityType = EntityType::Tasks;
    const FIELDS: &'static [&'static str] = &[
        "TaskID",
        "TaskName",
        "Category",
        "Duration",
        "RequiredSkills",
        "PreferredPhases",
        "MaxConcurrent",
    ];

    fn id(&self) -> &str {
        &self.task_id
    }

    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "TaskID" => self.task_id.clone(),
            "TaskName" => self.task_name.clone(),
            "Category" => self.category.clone(),
            "Duration" => self.duration.to_string(),
            "RequiredSkills" => self.required_skills.clone(),
            "PreferredPhases" => self.preferred_phases.clone(),
            "MaxConcurrent" => self.max_concurrent.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// The three tables as one borrowed bundle.
#[derive(Clone, Copy, Debug)]
pub struct Dataset<'a> {
    pub clients: &'a [Client],
    pub workers: &'a [Worker],
    pub tasks: &'a [Task],
}

impl<'a> Dataset<'a> {
    pub fn new(clients: &'a [Client], workers: &'a [Worker], tasks: &'a [Task]) -> Self {
        Self {
            clients,
            workers,
            tasks,
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&'a Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }
}
