//! Recommendation types.

use serde::{Deserialize, Serialize};

use crate::rules::{generate_id, BusinessRule, RuleParameters, RuleSource, RuleType};

/// The rule a recommendation proposes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedRule {
    pub name: String,
    #[serde(flatten)]
    pub parameters: RuleParameters,
}

/// Evidence behind a recommendation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataContext {
    /// Task, worker-group or phase identifiers the rule would touch.
    pub affected_entities: Vec<String>,
    /// Observed figures, e.g. `"Frequency: 3/10"`.
    pub patterns: Vec<String>,
}

/// A mined candidate rule awaiting acceptance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecommendation {
    pub id: String,
    /// Mirrors `suggested_rule`'s kind at the top level of the wire shape.
    #[serde(rename = "type")]
    pub kind: RuleType,
    /// In `0.0..=1.0`.
    pub confidence: f64,
    pub description: String,
    pub reasoning: String,
    pub suggested_rule: SuggestedRule,
    pub data_context: DataContext,
}

impl RuleRecommendation {
    pub(crate) fn new(
        id_prefix: &str,
        confidence: f64,
        description: String,
        reasoning: String,
        suggested_rule: SuggestedRule,
        data_context: DataContext,
    ) -> Self {
        Self {
            id: generate_id(id_prefix),
            kind: suggested_rule.parameters.rule_type(),
            confidence: confidence.clamp(0.0, 1.0),
            description,
            reasoning,
            suggested_rule,
            data_context,
        }
    }

    pub fn rule_type(&self) -> RuleType {
        self.suggested_rule.parameters.rule_type()
    }

    /// Promote into an enabled `ai-generated` rule, consuming the recommendation.
    pub fn into_rule(self) -> BusinessRule {
        BusinessRule::new(
            self.suggested_rule.name,
            self.description,
            self.suggested_rule.parameters,
            RuleSource::AiGenerated,
        )
    }
}
