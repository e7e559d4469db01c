//! Co-run mining: task pairs that clients keep requesting together.

use rustc_hash::FxHashMap;

use crate::config::MiningConfig;
use crate::fields::split_list;
use crate::models::{Dataset, Task};
use crate::rules::{CoRunParams, RuleParameters};
use crate::{log_changes, log_debug};

use super::types::{DataContext, RuleRecommendation, SuggestedRule};
use super::display_name;

/// Canonical pair key: the two IDs in sorted order.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Count unordered task-pair co-occurrences across client requests.
///
/// A task repeated inside one client's list counts once for that client.
pub fn count_task_pairs(dataset: &Dataset<'_>) -> FxHashMap<(String, String), usize> {
    let mut counts: FxHashMap<(String, String), usize> = FxHashMap::default();
    for client in dataset.clients {
        let mut requested = split_list(&client.requested_task_ids);
        requested.sort_unstable();
        requested.dedup();
        for (i, first) in requested.iter().enumerate() {
            for second in &requested[i + 1..] {
                *counts.entry(pair_key(first, second)).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Recommend co-run rules for pairs at or above the co-occurrence threshold.
pub fn analyze_co_run_patterns(
    dataset: &Dataset<'_>,
    config: &MiningConfig,
) -> Vec<RuleRecommendation> {
    let verbosity = config.verbosity;
    let client_count = dataset.clients.len();
    if client_count == 0 {
        return Vec::new();
    }
    let threshold = config.co_run_threshold(client_count);
    log_debug!(
        verbosity,
        "Co-run threshold {} over {} clients",
        threshold,
        client_count
    );

    let mut tasks_by_id: FxHashMap<&str, &Task> = FxHashMap::default();
    for task in dataset.tasks {
        tasks_by_id.entry(task.task_id.trim()).or_insert(task);
    }

    let mut frequent: Vec<((String, String), usize)> = count_task_pairs(dataset)
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .collect();
    frequent.sort();

    let mut out = Vec::new();
    for ((first_id, second_id), count) in frequent {
        // Pairs naming unknown tasks are left to reference validation
        let (Some(first), Some(second)) = (
            tasks_by_id.get(first_id.as_str()),
            tasks_by_id.get(second_id.as_str()),
        ) else {
            continue;
        };

        let share = count as f64 / client_count as f64;
        let confidence = config.co_run_confidence_cap.min(share);
        let (first_name, second_name) = (display_name(first), display_name(second));

        log_changes!(
            verbosity,
            "Co-run {}+{}: {}/{} clients",
            first_id,
            second_id,
            count,
            client_count
        );

        out.push(RuleRecommendation::new(
            "corun",
            confidence,
            format!(
                "Tasks {} and {} are frequently requested together",
                first_name, second_name
            ),
            format!(
                "These tasks appear together in {} out of {} client requests ({}%)",
                count,
                client_count,
                (share * 100.0).round()
            ),
            SuggestedRule {
                name: format!("Co-run: {} & {}", first_name, second_name),
                parameters: RuleParameters::CoRun(CoRunParams {
                    task_ids: vec![first_id.clone(), second_id.clone()],
                    must_run_together: true,
                }),
            },
            DataContext {
                affected_entities: vec![first_id.clone(), second_id.clone()],
                patterns: vec![
                    format!("Pair: {},{}", first_id, second_id),
                    format!("Frequency: {}/{}", count, client_count),
                ],
            },
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Client;
    use crate::rules::RuleType;

    fn make_client(id: usize, requested: &str) -> Client {
        Client {
            client_id: format!("C{}", id),
            client_name: format!("Client {}", id),
            requested_task_ids: requested.to_string(),
            ..Client::default()
        }
    }

    fn make_task(id: &str) -> Task {
        Task {
            task_id: id.to_string(),
            task_name: format!("Task {}", id),
            ..Task::default()
        }
    }

    fn clients_with_pair(pair_count: usize, total: usize) -> Vec<Client> {
        (0..total)
            .map(|i| {
                if i < pair_count {
                    make_client(i, "T2,T1")
                } else {
                    make_client(i, "T3")
                }
            })
            .collect()
    }

    #[test]
    fn test_pair_counting_is_order_insensitive() {
        let clients = vec![make_client(0, "T1,T2"), make_client(1, "T2, T1, T2")];
        let counts = count_task_pairs(&Dataset::new(&clients, &[], &[]));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&("T1".to_string(), "T2".to_string())], 2);
    }

    #[test]
    fn test_pair_at_threshold_is_recommended() {
        let clients = clients_with_pair(3, 10);
        let tasks = vec![make_task("T1"), make_task("T2"), make_task("T3")];
        let recs = analyze_co_run_patterns(
            &Dataset::new(&clients, &[], &tasks),
            &MiningConfig::default(),
        );
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.rule_type(), RuleType::CoRun);
        assert!((rec.confidence - 0.3).abs() < 1e-9);
        assert_eq!(rec.data_context.affected_entities, vec!["T1", "T2"]);
        assert!(rec.reasoning.contains("3 out of 10"));
        assert!(rec.reasoning.contains("(30%)"));
    }

    #[test]
    fn test_pair_below_threshold_is_ignored() {
        let clients = clients_with_pair(2, 10);
        let tasks = vec![make_task("T1"), make_task("T2")];
        let recs = analyze_co_run_patterns(
            &Dataset::new(&clients, &[], &tasks),
            &MiningConfig::default(),
        );
        assert!(recs.is_empty());
    }

    #[test]
    fn test_confidence_is_capped() {
        let clients = clients_with_pair(4, 4);
        let tasks = vec![make_task("T1"), make_task("T2")];
        let recs = analyze_co_run_patterns(
            &Dataset::new(&clients, &[], &tasks),
            &MiningConfig::default(),
        );
        assert!((recs[0].confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_task_pair_skipped() {
        let clients = clients_with_pair(5, 5);
        let tasks = vec![make_task("T1")];
        let recs = analyze_co_run_patterns(
            &Dataset::new(&clients, &[], &tasks),
            &MiningConfig::default(),
        );
        assert!(recs.is_empty());
    }
}
