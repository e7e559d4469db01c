//! Workload mining: worker groups whose load limits crowd their availability.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

use crate::config::MiningConfig;
use crate::fields::decode_phase_list;
use crate::models::Dataset;
use crate::rules::{LoadLimitParams, RuleParameters};
use crate::{log_changes, log_checks, log_debug};

use super::types::{DataContext, RuleRecommendation, SuggestedRule};

/// Per-group totals over workers with decodable slot lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupWorkload {
    pub workers: usize,
    pub total_slots: usize,
    pub total_max_load: i64,
    /// Union of the group's available phases.
    pub phases: BTreeSet<u32>,
}

impl GroupWorkload {
    pub fn avg_slots(&self) -> f64 {
        self.total_slots as f64 / self.workers.max(1) as f64
    }

    pub fn avg_max_load(&self) -> f64 {
        self.total_max_load as f64 / self.workers.max(1) as f64
    }
}

/// Aggregate workers by `WorkerGroup`, skipping malformed slot lists.
pub fn group_workloads(dataset: &Dataset<'_>, verbosity: u8) -> FxHashMap<String, GroupWorkload> {
    let mut groups: FxHashMap<String, GroupWorkload> = FxHashMap::default();
    for worker in dataset.workers {
        let slots = match decode_phase_list(&worker.available_slots) {
            Ok(slots) => slots,
            Err(err) => {
                log_checks!(
                    verbosity,
                    "Workload: skipping worker {:?} ({})",
                    worker.worker_id,
                    err
                );
                continue;
            }
        };
        let group = groups.entry(worker.worker_group.trim().to_string()).or_default();
        group.workers += 1;
        group.total_slots += slots.len();
        group.total_max_load = group.total_max_load.saturating_add(worker.max_load_per_phase);
        group.phases.extend(slots);
    }
    groups
}

/// Recommend load limits for groups whose average max load exceeds the trigger.
pub fn analyze_workload_distribution(
    dataset: &Dataset<'_>,
    config: &MiningConfig,
) -> Vec<RuleRecommendation> {
    let verbosity = config.verbosity;
    let mut groups: Vec<(String, GroupWorkload)> =
        group_workloads(dataset, verbosity).into_iter().collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::new();
    for (group, load) in groups {
        let avg_slots = load.avg_slots();
        let avg_load = load.avg_max_load();
        log_debug!(
            verbosity,
            "Workload {:?}: avg load {:.2} vs avg slots {:.2}",
            group,
            avg_load,
            avg_slots
        );
        if avg_load <= avg_slots * config.load_ratio_trigger {
            continue;
        }

        let cap = (avg_slots * config.load_cap_ratio).floor().max(0.0) as u32;
        if cap < 1 {
            log_checks!(
                verbosity,
                "Workload {:?}: suggested cap rounds to 0 over {:.2} avg slots, skipping",
                group,
                avg_slots
            );
            continue;
        }
        log_changes!(verbosity, "Load limit for {:?}: {} slots/phase", group, cap);

        out.push(RuleRecommendation::new(
            "loadlimit",
            config.load_confidence,
            format!("{} workers may be overloaded", group),
            format!(
                "Average max load ({:.1}) is high relative to available slots ({:.1})",
                avg_load, avg_slots
            ),
            SuggestedRule {
                name: format!("Load Limit: {}", group),
                parameters: RuleParameters::LoadLimit(LoadLimitParams {
                    worker_group: group.clone(),
                    max_slots_per_phase: cap,
                    phases: load.phases.iter().copied().collect(),
                }),
            },
            DataContext {
                affected_entities: vec![group.clone()],
                patterns: vec![
                    format!("Avg load: {:.1}", avg_load),
                    format!("Avg slots: {:.1}", avg_slots),
                    format!("Workers: {}", load.workers),
                ],
            },
        ));
    }
    out
}
