//! Skill coverage mining: tasks that hinge on skills few workers hold.

use rustc_hash::FxHashMap;

use crate::config::MiningConfig;
use crate::fields::split_tags;
use crate::models::{Dataset, EntityType};
use crate::rules::{PatternAction, PatternMatchParams, RuleParameters};
use crate::log_changes;

use super::display_name;
use super::types::{DataContext, RuleRecommendation, SuggestedRule};

/// Number of workers holding each (lowercased) skill.
pub fn skill_coverage(dataset: &Dataset<'_>) -> FxHashMap<String, usize> {
    let mut coverage: FxHashMap<String, usize> = FxHashMap::default();
    for worker in dataset.workers {
        for skill in split_tags(&worker.skills) {
            *coverage.entry(skill).or_insert(0) += 1;
        }
    }
    coverage
}

/// Flag tasks whose scarcest required skill has at most `critical_coverage` workers.
pub fn analyze_skill_coverage(
    dataset: &Dataset<'_>,
    config: &MiningConfig,
) -> Vec<RuleRecommendation> {
    let coverage = skill_coverage(dataset);
    let count = |skill: &str| coverage.get(skill).copied().unwrap_or(0);

    let mut out = Vec::new();
    for task in dataset.tasks {
        let required = split_tags(&task.required_skills);
        let Some(min_coverage) = required.iter().map(|s| count(s)).min() else {
            continue;
        };
        if min_coverage > config.critical_coverage {
            continue;
        }

        let critical: Vec<&str> = required
            .iter()
            .map(String::as_str)
            .filter(|s| count(s) <= config.critical_coverage)
            .collect();
        let breakdown: Vec<String> = critical
            .iter()
            .map(|s| format!("{}={}", s, count(s)))
            .collect();
        let name = display_name(task);

        log_changes!(
            config.verbosity,
            "Skill coverage: task {:?} critical on {}",
            task.task_id,
            critical.join(", ")
        );

        out.push(RuleRecommendation::new(
            "skill",
            config.skill_confidence,
            format!("Task {} has limited skill coverage", name),
            format!(
                "Critical skills with at most {} qualified worker(s): {}",
                config.critical_coverage,
                critical.join(", ")
            ),
            SuggestedRule {
                name: format!("Skill Priority: {}", name),
                parameters: RuleParameters::PatternMatch(PatternMatchParams {
                    pattern: format!("^{}$", regex::escape(task.task_id.trim())),
                    field: EntityType::Tasks.id_field().to_string(),
                    entity_type: EntityType::Tasks,
                    action: PatternAction::Flag,
                }),
            },
            DataContext {
                affected_entities: vec![task.task_id.clone()],
                patterns: vec![
                    format!("Critical skills: {}", critical.join(", ")),
                    format!("Coverage: {}", breakdown.join(", ")),
                ],
            },
        ));
    }
    out
}
