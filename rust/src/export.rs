//! Export documents: accepted rules, the active profile and cleaned tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Client, Record, Task, Worker};
use crate::prioritization::PrioritizationProfile;
use crate::rules::{BusinessRule, RuleType};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesMetadata {
    pub exported_at: DateTime<Utc>,
    pub total_rules: usize,
    pub enabled_rules: usize,
    /// Distinct kinds across all rules, enabled or not, in first-seen order.
    pub rule_types: Vec<RuleType>,
}

/// `{ rules, metadata }` with only the enabled rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RulesDocument {
    pub rules: Vec<BusinessRule>,
    pub metadata: RulesMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetadata {
    pub exported_at: DateTime<Utc>,
    pub total_criteria: usize,
    pub weight_sum: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub profile: PrioritizationProfile,
    pub metadata: ProfileMetadata,
}

pub fn rules_document(rules: &[BusinessRule]) -> RulesDocument {
    let enabled: Vec<BusinessRule> = rules.iter().filter(|r| r.enabled).cloned().collect();
    let mut rule_types: Vec<RuleType> = Vec::new();
    for rule in rules {
        if !rule_types.contains(&rule.rule_type()) {
            rule_types.push(rule.rule_type());
        }
    }
    RulesDocument {
        metadata: RulesMetadata {
            exported_at: Utc::now(),
            total_rules: rules.len(),
            enabled_rules: enabled.len(),
            rule_types,
        },
        rules: enabled,
    }
}

pub fn profile_document(profile: &PrioritizationProfile) -> ProfileDocument {
    ProfileDocument {
        metadata: ProfileMetadata {
            exported_at: Utc::now(),
            total_criteria: profile.criteria.len(),
            weight_sum: profile.weight_sum(),
        },
        profile: profile.clone(),
    }
}

/// Pretty-printed JSON.
pub fn render<T: Serialize>(document: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV with the column headers as the first line. Empty input gives "".
pub fn to_csv<R: Record>(records: &[R]) -> String {
    if records.is_empty() {
        return String::new();
    }
    let mut lines = vec![R::FIELDS.join(",")];
    for record in records {
        let cells: Vec<String> = R::FIELDS
            .iter()
            .map(|field| csv_cell(&record.field(field).unwrap_or_default()))
            .collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

/// Which documents [`export_files`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub include_cleaned_data: bool,
    pub include_rules: bool,
    pub include_prioritization: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_cleaned_data: true,
            include_rules: true,
            include_prioritization: true,
        }
    }
}

/// A named export artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    pub filename: String,
    pub content: String,
}

/// Everything one export produces. Empty tables are left out.
pub fn export_files(
    options: &ExportOptions,
    clients: &[Client],
    workers: &[Worker],
    tasks: &[Task],
    rules: &[BusinessRule],
    profile: &PrioritizationProfile,
) -> Result<Vec<ExportFile>> {
    let mut files = Vec::new();
    let mut push = |filename: &str, content: String| {
        files.push(ExportFile {
            filename: filename.to_string(),
            content,
        })
    };

    if options.include_cleaned_data {
        if !clients.is_empty() {
            push("clients_cleaned.csv", to_csv(clients));
        }
        if !workers.is_empty() {
            push("workers_cleaned.csv", to_csv(workers));
        }
        if !tasks.is_empty() {
            push("tasks_cleaned.csv", to_csv(tasks));
        }
    }
    if options.include_rules {
        push("rules.json", render(&rules_document(rules))?);
    }
    if options.include_prioritization {
        push("prioritization.json", render(&profile_document(profile))?);
    }
    Ok(files)
}
