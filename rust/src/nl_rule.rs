//! Keyword-driven parsing of plain-English rule requests.
//!
//! Routing looks at the lowercased text, first match wins:
//!
//! | keywords                                   | rule              |
//! |--------------------------------------------|-------------------|
//! | `together`, `co-run`, `same time`          | co-run            |
//! | `limit` with `load`/`workload`             | load-limit        |
//! | `phase` with `only`/`restrict`             | phase-window      |
//! | `group`/`clients` with `slot`              | slot-restriction  |

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::error::{PrepError, Result};
use crate::fields::decode_phase_list;
use crate::models::Dataset;
use crate::rules::{
    BusinessRule, CoRunParams, GroupType, LoadLimitParams, PhaseWindowParams, RuleParameters,
    RuleSource, SlotRestrictionParams,
};

/// Phases assumed when the text and the data say nothing more specific.
pub const DEFAULT_PHASES: [u32; 6] = [1, 2, 3, 4, 5, 6];

pub const WORKER_GROUPS: &[&str] = &[
    "frontend",
    "backend",
    "design",
    "devops",
    "qa",
    "mobile",
    "data-science",
    "management",
];

pub const CLIENT_GROUPS: &[&str] = &[
    "enterprise",
    "startup",
    "small-business",
    "research",
    "healthcare",
    "finance",
];

/// Compile `pattern` once into `cell`.
pub(crate) fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> Result<&'static Regex> {
    if let Some(re) = cell.get() {
        return Ok(re);
    }
    let re = Regex::new(pattern)?;
    Ok(cell.get_or_init(|| re))
}

fn task_id_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"\bT\d+\b")
}

fn number_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"\d+")
}

fn phase_list_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(
        &RE,
        r"(?i)\bphases?\s+(\d+(?:\s*(?:,|&|\band\b|\bor\b)\s*(?:and\s+)?\d+)*)",
    )
}

fn first_number(input: &str) -> Result<Option<u32>> {
    Ok(number_regex()?
        .find(input)
        .and_then(|m| m.as_str().parse().ok()))
}

/// First known group name mentioned in `lower`, by position in the text.
fn find_group(lower: &str, groups: &[&'static str]) -> Option<&'static str> {
    groups
        .iter()
        .filter_map(|g| lower.find(g).map(|pos| (pos, *g)))
        .min()
        .map(|(_, g)| g)
}

fn unrecognized(input: &str) -> PrepError {
    PrepError::UnrecognizedRule(input.to_string())
}

/// Turn a plain-English request into an `ai-generated` rule.
///
/// Fails with [`PrepError::UnrecognizedRule`] when no branch applies or the
/// chosen branch cannot find what it needs.
pub fn parse_rule(input: &str, dataset: &Dataset<'_>) -> Result<BusinessRule> {
    let lower = input.to_lowercase();
    let has = |word: &str| lower.contains(word);

    let rule = if has("together") || has("co-run") || has("same time") {
        parse_co_run(input, dataset)?
    } else if has("limit") && (has("load") || has("workload")) {
        parse_load_limit(input, &lower, dataset)?
    } else if has("phase") && (has("only") || has("restrict")) {
        parse_phase_window(input)?
    } else if (has("group") || has("clients")) && has("slot") {
        parse_slot_restriction(input, &lower)?
    } else {
        None
    };

    let rule = rule.ok_or_else(|| unrecognized(input))?;
    rule.check()?;
    Ok(rule)
}

fn parse_co_run(input: &str, dataset: &Dataset<'_>) -> Result<Option<BusinessRule>> {
    let mut task_ids: Vec<String> = Vec::new();
    for m in task_id_regex()?.find_iter(input) {
        let id = m.as_str();
        if dataset.task(id).is_some() && !task_ids.iter().any(|t| t == id) {
            task_ids.push(id.to_string());
        }
    }
    if task_ids.len() < 2 {
        return Ok(None);
    }
    Ok(Some(BusinessRule::new(
        format!("Co-run: {}", task_ids.join(" & ")),
        format!("Tasks {} must run together", task_ids.join(" and ")),
        RuleParameters::CoRun(CoRunParams {
            task_ids,
            must_run_together: true,
        }),
        RuleSource::AiGenerated,
    )))
}

fn parse_load_limit(
    input: &str,
    lower: &str,
    dataset: &Dataset<'_>,
) -> Result<Option<BusinessRule>> {
    let (Some(limit), Some(group)) = (first_number(input)?, find_group(lower, WORKER_GROUPS)) else {
        return Ok(None);
    };

    // Phases the group is actually available in, when the data says
    let mut phases = BTreeSet::new();
    for worker in dataset.workers {
        if worker.worker_group.trim().eq_ignore_ascii_case(group) {
            if let Ok(slots) = decode_phase_list(&worker.available_slots) {
                phases.extend(slots);
            }
        }
    }
    let phases: Vec<u32> = if phases.is_empty() {
        DEFAULT_PHASES.to_vec()
    } else {
        phases.into_iter().collect()
    };

    Ok(Some(BusinessRule::new(
        format!("Load Limit: {}", group),
        format!("Limit {} workers to {} slots per phase", group, limit),
        RuleParameters::LoadLimit(LoadLimitParams {
            worker_group: group.to_string(),
            max_slots_per_phase: limit,
            phases,
        }),
        RuleSource::AiGenerated,
    )))
}

fn parse_phase_window(input: &str) -> Result<Option<BusinessRule>> {
    let Some(task) = task_id_regex()?.find(input) else {
        return Ok(None);
    };
    let numbers = number_regex()?;
    let mut phases: Vec<u32> = Vec::new();
    for caps in phase_list_regex()?.captures_iter(input) {
        let Some(list) = caps.get(1) else { continue };
        for n in numbers.find_iter(list.as_str()) {
            if let Ok(phase) = n.as_str().parse::<u32>() {
                if phase >= 1 && !phases.contains(&phase) {
                    phases.push(phase);
                }
            }
        }
    }
    if phases.is_empty() {
        return Ok(None);
    }

    let task_id = task.as_str();
    Ok(Some(BusinessRule::new(
        format!("Phase Window: {}", task_id),
        format!("Restrict {} to specific phases", task_id),
        RuleParameters::PhaseWindow(PhaseWindowParams {
            task_id: task_id.to_string(),
            allowed_phases: phases,
            restricted_phases: Vec::new(),
        }),
        RuleSource::AiGenerated,
    )))
}

fn parse_slot_restriction(input: &str, lower: &str) -> Result<Option<BusinessRule>> {
    let (Some(min_slots), Some(group)) = (first_number(input)?, find_group(lower, CLIENT_GROUPS))
    else {
        return Ok(None);
    };
    Ok(Some(BusinessRule::new(
        format!("Slot Restriction: {}", group),
        format!("Require {} clients to have {} common slots", group, min_slots),
        RuleParameters::SlotRestriction(SlotRestrictionParams {
            target_group: group.to_string(),
            group_type: GroupType::Client,
            min_common_slots: min_slots,
            phases: DEFAULT_PHASES.to_vec(),
        }),
        RuleSource::AiGenerated,
    )))
}
