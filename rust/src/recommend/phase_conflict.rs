//! Phase conflict mining: phases whose task demand outruns worker capacity.

use std::collections::BTreeMap;

use crate::config::MiningConfig;
use crate::fields::decode_phase_list;
use crate::models::{Dataset, Task};
use crate::rules::{PhaseWindowParams, RuleParameters};
use crate::{log_changes, log_checks, log_debug};

use super::types::{DataContext, RuleRecommendation, SuggestedRule};

/// Per-phase capacity and demand, keyed by phase number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseLoad {
    /// Sum of `MaxLoadPerPhase` over workers available in the phase.
    pub capacity: BTreeMap<u32, i64>,
    /// Sum of `Duration * MaxConcurrent` over tasks preferring the phase.
    pub demand: BTreeMap<u32, i64>,
}

impl PhaseLoad {
    pub fn capacity_of(&self, phase: u32) -> i64 {
        self.capacity.get(&phase).copied().unwrap_or(0)
    }

    pub fn demand_of(&self, phase: u32) -> i64 {
        self.demand.get(&phase).copied().unwrap_or(0)
    }
}

fn task_demand(task: &Task) -> i64 {
    task.duration.max(0).saturating_mul(task.max_concurrent.max(0))
}

/// Tally capacity and demand, skipping records with malformed phase lists.
pub fn phase_load(dataset: &Dataset<'_>, verbosity: u8) -> PhaseLoad {
    let mut load = PhaseLoad::default();

    for worker in dataset.workers {
        match decode_phase_list(&worker.available_slots) {
            Ok(slots) => {
                for phase in slots {
                    let capacity = load.capacity.entry(phase).or_insert(0);
                    *capacity = capacity.saturating_add(worker.max_load_per_phase.max(0));
                }
            }
            Err(err) => log_checks!(
                verbosity,
                "Phase load: skipping worker {:?} ({})",
                worker.worker_id,
                err
            ),
        }
    }

    for task in dataset.tasks {
        match decode_phase_list(&task.preferred_phases) {
            Ok(phases) => {
                for phase in phases {
                    let demand = load.demand.entry(phase).or_insert(0);
                    *demand = demand.saturating_add(task_demand(task));
                }
            }
            Err(err) => log_checks!(
                verbosity,
                "Phase load: skipping task {:?} ({})",
                task.task_id,
                err
            ),
        }
    }
    load
}

/// Heaviest task preferring `phase`; ties go to the earliest row.
fn heaviest_task<'a>(dataset: &Dataset<'a>, phase: u32) -> Option<&'a Task> {
    let mut best: Option<(&Task, i64)> = None;
    for task in dataset.tasks {
        let prefers = decode_phase_list(&task.preferred_phases)
            .map(|phases| phases.contains(&phase))
            .unwrap_or(false);
        if !prefers {
            continue;
        }
        let demand = task_demand(task);
        if best.map_or(true, |(_, d)| demand > d) {
            best = Some((task, demand));
        }
    }
    best.map(|(task, _)| task)
}

/// Recommend moving work out of overloaded phases into phases with headroom.
pub fn analyze_phase_conflicts(
    dataset: &Dataset<'_>,
    config: &MiningConfig,
) -> Vec<RuleRecommendation> {
    let verbosity = config.verbosity;
    let load = phase_load(dataset, verbosity);

    let mut out = Vec::new();
    for (&phase, &demand) in &load.demand {
        let capacity = load.capacity_of(phase);
        if demand as f64 <= capacity as f64 * config.phase_overload_ratio {
            continue;
        }

        let alternatives: Vec<u32> = load
            .capacity
            .iter()
            .filter(|&(&p, &cap)| {
                p != phase && (load.demand_of(p) as f64) < cap as f64 * config.phase_headroom_ratio
            })
            .map(|(&p, _)| p)
            .take(config.max_alternative_phases)
            .collect();
        log_debug!(
            verbosity,
            "Phase {} overloaded: demand {} vs capacity {}, alternatives {:?}",
            phase,
            demand,
            capacity,
            alternatives
        );
        if alternatives.is_empty() {
            continue;
        }

        let task = heaviest_task(dataset, phase);
        let task_id = task.map(|t| t.task_id.clone()).unwrap_or_default();
        let mut affected = vec![format!("phase_{}", phase)];
        affected.extend(
            dataset
                .tasks
                .iter()
                .filter(|t| {
                    decode_phase_list(&t.preferred_phases)
                        .map(|phases| phases.contains(&phase))
                        .unwrap_or(false)
                })
                .map(|t| t.task_id.clone()),
        );
        let alt_text: Vec<String> = alternatives.iter().map(u32::to_string).collect();

        log_changes!(
            verbosity,
            "Phase window: move {:?} out of phase {} into {:?}",
            task_id,
            phase,
            alternatives
        );

        out.push(RuleRecommendation::new(
            "phase",
            config.phase_confidence,
            format!("Phase {} is overloaded", phase),
            format!(
                "Demand ({}) exceeds {}% of capacity ({}). Consider redistributing tasks.",
                demand,
                (config.phase_overload_ratio * 100.0).round(),
                capacity
            ),
            SuggestedRule {
                name: format!("Phase Redistribution: Phase {}", phase),
                parameters: RuleParameters::PhaseWindow(PhaseWindowParams {
                    task_id,
                    allowed_phases: alternatives.clone(),
                    restricted_phases: vec![phase],
                }),
            },
            DataContext {
                affected_entities: affected,
                patterns: vec![
                    format!("Demand: {}", demand),
                    format!("Capacity: {}", capacity),
                    format!("Alternatives: {}", alt_text.join(",")),
                ],
            },
        ));
    }
    out
}
