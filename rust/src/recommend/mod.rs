//! Heuristic rule mining.
//!
//! Four independent analyses read the whole dataset and propose rules:
//! - co-run: task pairs clients request together
//! - workload: worker groups whose load limit crowds their availability
//! - skill coverage: tasks depending on skills one worker or none holds
//! - phase conflict: phases where demand outruns capacity
//!
//! Miners never fail. Records whose encoded fields do not decode are skipped;
//! reporting them is the validator's job.

pub mod co_run;
pub mod phase_conflict;
pub mod skill_coverage;
pub mod types;
pub mod workload;

pub use co_run::{analyze_co_run_patterns, count_task_pairs};
pub use phase_conflict::{analyze_phase_conflicts, phase_load, PhaseLoad};
pub use skill_coverage::{analyze_skill_coverage, skill_coverage};
pub use types::{DataContext, RuleRecommendation, SuggestedRule};
pub use workload::{analyze_workload_distribution, group_workloads, GroupWorkload};

use crate::config::MiningConfig;
use crate::models::{Client, Dataset, Task, Worker};
use crate::log_changes;

/// Task name for messages, falling back to the ID when the name is blank.
pub(crate) fn display_name(task: &Task) -> &str {
    let name = task.task_name.trim();
    if name.is_empty() {
        task.task_id.trim()
    } else {
        name
    }
}

/// Run all miners with default thresholds.
pub fn mine_recommendations(
    clients: &[Client],
    workers: &[Worker],
    tasks: &[Task],
) -> Vec<RuleRecommendation> {
    mine_recommendations_with(
        &Dataset::new(clients, workers, tasks),
        &MiningConfig::default(),
    )
}

/// Run all miners: co-run, workload, skill coverage, then phase conflicts.
pub fn mine_recommendations_with(
    dataset: &Dataset<'_>,
    config: &MiningConfig,
) -> Vec<RuleRecommendation> {
    let mut out = analyze_co_run_patterns(dataset, config);
    out.extend(analyze_workload_distribution(dataset, config));
    out.extend(analyze_skill_coverage(dataset, config));
    out.extend(analyze_phase_conflicts(dataset, config));

    log_changes!(
        config.verbosity,
        "Mined {} recommendations from {} clients, {} workers, {} tasks",
        out.len(),
        dataset.clients.len(),
        dataset.workers.len(),
        dataset.tasks.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleType;

    fn make_client(id: &str, requested: &str) -> Client {
        Client {
            client_id: id.to_string(),
            client_name: id.to_string(),
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
            worker_group: "backend".to_string(),
            ..Worker::default()
        }
    }

    fn make_task(id: &str, skills: &str, phases: &str) -> Task {
        Task {
            task_id: id.to_string(),
            task_name: format!("Task {}", id),
            required_skills: skills.to_string(),
            preferred_phases: phases.to_string(),
            ..Task::default()
        }
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut task = make_task("T1", "", "");
        assert_eq!(display_name(&task), "Task T1");
        task.task_name = "  ".to_string();
        assert_eq!(display_name(&task), "T1");
    }

    #[test]
    fn test_empty_dataset_mines_nothing() {
        assert!(mine_recommendations(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_miners_run_in_order() {
        let clients = vec![
            make_client("C1", "T1,T2"),
            make_client("C2", "T1,T2"),
        ];
        let workers = vec![
            make_worker("W1", "python", "[1,2,3]", 3),
            make_worker("W2", "python", "[1,2,3]", 3),
        ];
        let tasks = vec![
            make_task("T1", "python", "[1]"),
            make_task("T2", "rust", "[]"),
        ];
        let kinds: Vec<RuleType> = mine_recommendations(&clients, &workers, &tasks)
            .iter()
            .map(RuleRecommendation::rule_type)
            .collect();
        assert_eq!(
            kinds,
            vec![RuleType::CoRun, RuleType::LoadLimit, RuleType::PatternMatch]
        );
    }

    #[test]
    fn test_malformed_records_do_not_break_mining() {
        let workers = vec![make_worker("W1", "python", "{bad", 2)];
        let tasks = vec![make_task("T1", "python", "not a list")];
        let recs = mine_recommendations(&[], &workers, &tasks);
        // only the single-holder skill is reported
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].rule_type(), RuleType::PatternMatch);
    }
}
