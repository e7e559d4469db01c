//! Prioritization profiles: weighted criteria used to rank allocations.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionCategory {
    Fulfillment,
    Distribution,
    Workload,
    Efficiency,
}

/// One weighted criterion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationCriterion {
    pub id: String,
    pub name: String,
    /// In `0.0..=1.0`.
    pub weight: f64,
    pub description: String,
    pub category: CriterionCategory,
}

fn criterion(
    id: &str,
    name: &str,
    weight: f64,
    description: &str,
    category: CriterionCategory,
) -> PrioritizationCriterion {
    PrioritizationCriterion {
        id: id.to_string(),
        name: name.to_string(),
        weight,
        description: description.to_string(),
        category,
    }
}

/// The five criteria every preset starts from.
pub fn base_criteria() -> Vec<PrioritizationCriterion> {
    use CriterionCategory::*;
    vec![
        criterion(
            "priority-level",
            "Client Priority Level",
            0.3,
            "Weight given to client priority levels (1-5)",
            Fulfillment,
        ),
        criterion(
            "task-urgency",
            "Task Urgency",
            0.25,
            "Priority based on task deadlines and duration",
            Fulfillment,
        ),
        criterion(
            "worker-utilization",
            "Worker Utilization",
            0.2,
            "Balance workload across available workers",
            Distribution,
        ),
        criterion(
            "skill-matching",
            "Skill Matching",
            0.15,
            "Quality of skill match between workers and tasks",
            Efficiency,
        ),
        criterion(
            "phase-optimization",
            "Phase Optimization",
            0.1,
            "Optimize task scheduling across phases",
            Efficiency,
        ),
    ]
}

/// A named set of criteria.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub criteria: Vec<PrioritizationCriterion>,
    pub is_default: bool,
}

impl PrioritizationProfile {
    fn preset(
        id: &str,
        name: &str,
        description: &str,
        is_default: bool,
        factor: impl Fn(CriterionCategory) -> f64,
    ) -> Self {
        let criteria = base_criteria()
            .into_iter()
            .map(|c| PrioritizationCriterion {
                weight: c.weight * factor(c.category),
                ..c
            })
            .collect();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            criteria,
            is_default,
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.criteria.iter().map(|c| c.weight).sum()
    }

    pub fn criterion(&self, criterion_id: &str) -> Option<&PrioritizationCriterion> {
        self.criteria.iter().find(|c| c.id == criterion_id)
    }

    /// Set one criterion's weight; `weight` must lie in `0.0..=1.0`.
    pub fn set_weight(&mut self, criterion_id: &str, weight: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(PrepError::InvalidWeight(weight));
        }
        let criterion = self
            .criteria
            .iter_mut()
            .find(|c| c.id == criterion_id)
            .ok_or_else(|| PrepError::CriterionNotFound(criterion_id.to_string()))?;
        criterion.weight = weight;
        Ok(())
    }

    /// Rescale weights to sum to 1. No-op when every weight is zero.
    pub fn normalize(&mut self) {
        let total = self.weight_sum();
        if total <= 0.0 {
            return;
        }
        for c in &mut self.criteria {
            c.weight /= total;
        }
    }

    /// Weighted sum of per-criterion scores; missing scores count as 0.
    pub fn score(&self, scores: &FxHashMap<String, f64>) -> f64 {
        self.criteria
            .iter()
            .map(|c| c.weight * scores.get(&c.id).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn weights_by_category(&self) -> FxHashMap<CriterionCategory, f64> {
        let mut totals: FxHashMap<CriterionCategory, f64> = FxHashMap::default();
        for c in &self.criteria {
            *totals.entry(c.category).or_insert(0.0) += c.weight;
        }
        totals
    }
}

/// The four presets. `balanced` is the default.
pub fn default_profiles() -> Vec<PrioritizationProfile> {
    use CriterionCategory::*;
    vec![
        PrioritizationProfile::preset(
            "maximize-fulfillment",
            "Maximize Fulfillment",
            "Prioritize completing as many high-priority client requests as possible",
            false,
            |cat| if cat == Fulfillment { 1.5 } else { 0.7 },
        ),
        PrioritizationProfile::preset(
            "balanced",
            "Balanced Approach",
            "Balance between fulfillment, fair distribution, and efficiency",
            true,
            |_| 1.0,
        ),
        PrioritizationProfile::preset(
            "fair-distribution",
            "Fair Distribution",
            "Ensure equitable workload distribution across all workers",
            false,
            |cat| if cat == Distribution { 1.8 } else { 0.8 },
        ),
        PrioritizationProfile::preset(
            "minimize-workload",
            "Minimize Workload",
            "Optimize for minimal overall workload and maximum efficiency",
            false,
            |cat| {
                if matches!(cat, Workload | Efficiency) {
                    1.4
                } else {
                    0.9
                }
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile(id: &str) -> PrioritizationProfile {
        default_profiles()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap()
    }

    #[test]
    fn test_presets() {
        let profiles = default_profiles();
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["maximize-fulfillment", "balanced", "fair-distribution", "minimize-workload"]
        );
        assert_eq!(profiles.iter().filter(|p| p.is_default).count(), 1);
        assert!((make_profile("balanced").weight_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_preset_scaling() {
        let profile = make_profile("maximize-fulfillment");
        assert!((profile.criterion("priority-level").unwrap().weight - 0.45).abs() < 1e-9);
        assert!((profile.criterion("skill-matching").unwrap().weight - 0.105).abs() < 1e-9);

        let profile = make_profile("fair-distribution");
        assert!((profile.criterion("worker-utilization").unwrap().weight - 0.36).abs() < 1e-9);
    }

    #[test]
    fn test_set_weight_bounds() {
        let mut profile = make_profile("balanced");
        profile.set_weight("skill-matching", 0.5).unwrap();
        assert!((profile.weight_sum() - 1.35).abs() < 1e-9);

        assert!(matches!(
            profile.set_weight("skill-matching", 1.2),
            Err(PrepError::InvalidWeight(_))
        ));
        assert!(matches!(
            profile.set_weight("nope", 0.2),
            Err(PrepError::CriterionNotFound(_))
        ));
    }

    #[test]
    fn test_normalize() {
        let mut profile = make_profile("fair-distribution");
        profile.normalize();
        assert!((profile.weight_sum() - 1.0).abs() < 1e-9);

        for c in &mut profile.criteria {
            c.weight = 0.0;
        }
        profile.normalize();
        assert_eq!(profile.weight_sum(), 0.0);
    }

    #[test]
    fn test_score_and_categories() {
        let profile = make_profile("balanced");
        let mut scores = FxHashMap::default();
        scores.insert("priority-level".to_string(), 1.0);
        scores.insert("skill-matching".to_string(), 0.5);
        assert!((profile.score(&scores) - 0.375).abs() < 1e-9);

        let by_category = profile.weights_by_category();
        assert!((by_category[&CriterionCategory::Fulfillment] - 0.55).abs() < 1e-9);
        assert!((by_category[&CriterionCategory::Efficiency] - 0.25).abs() < 1e-9);
        assert!(!by_category.contains_key(&CriterionCategory::Workload));
    }
}
