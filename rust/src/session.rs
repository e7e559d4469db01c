//! Caller-owned working state: tables, findings, rules and profiles.
//!
//! Nothing here is global. A host builds a [`Session`], loads tables into it
//! and drives validation, mining and rule editing through its methods.

use serde::{Deserialize, Serialize};

use crate::config::{MiningConfig, ValidationConfig};
use crate::error::{PrepError, Result};
use crate::export::{self, ExportFile, ExportOptions};
use crate::models::{Client, Dataset, Task, Worker};
use crate::nl_rule;
use crate::prioritization::{default_profiles, PrioritizationProfile};
use crate::query::{self, QueryResult};
use crate::recommend::{mine_recommendations_with, RuleRecommendation};
use crate::rules::{BusinessRule, RuleParameters};
use crate::validation::{validation_report, ValidationReport};
use crate::log_changes;

/// Profile selected in a fresh session.
pub const DEFAULT_PROFILE_ID: &str = "balanced";

/// Partial edit of a rule; `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parameters: Option<RuleParameters>,
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct Session {
    clients: Vec<Client>,
    workers: Vec<Worker>,
    tasks: Vec<Task>,
    report: ValidationReport,
    rules: Vec<BusinessRule>,
    recommendations: Vec<RuleRecommendation>,
    profiles: Vec<PrioritizationProfile>,
    active_profile_id: String,
    validation_config: ValidationConfig,
    mining_config: MiningConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default(), MiningConfig::default())
    }

    pub fn with_config(validation_config: ValidationConfig, mining_config: MiningConfig) -> Self {
        Self {
            clients: Vec::new(),
            workers: Vec::new(),
            tasks: Vec::new(),
            report: ValidationReport::default(),
            rules: Vec::new(),
            recommendations: Vec::new(),
            profiles: default_profiles(),
            active_profile_id: DEFAULT_PROFILE_ID.to_string(),
            validation_config,
            mining_config,
        }
    }

    fn verbosity(&self) -> u8 {
        self.validation_config
            .verbosity
            .max(self.mining_config.verbosity)
    }

    pub fn dataset(&self) -> Dataset<'_> {
        Dataset::new(&self.clients, &self.workers, &self.tasks)
    }

    // Tables

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn set_clients(&mut self, clients: Vec<Client>) {
        log_changes!(self.verbosity(), "Loaded {} clients", clients.len());
        self.clients = clients;
    }

    pub fn set_workers(&mut self, workers: Vec<Worker>) {
        log_changes!(self.verbosity(), "Loaded {} workers", workers.len());
        self.workers = workers;
    }

    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        log_changes!(self.verbosity(), "Loaded {} tasks", tasks.len());
        self.tasks = tasks;
    }

    // Validation and mining

    /// Findings from the last [`Session::run_validation`].
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn run_validation(&mut self) -> &ValidationReport {
        self.report = validation_report(&self.dataset(), &self.validation_config);
        &self.report
    }

    pub fn recommendations(&self) -> &[RuleRecommendation] {
        &self.recommendations
    }

    /// Replace the pending recommendations with a fresh mining pass.
    pub fn refresh_recommendations(&mut self) -> &[RuleRecommendation] {
        self.recommendations = mine_recommendations_with(&self.dataset(), &self.mining_config);
        &self.recommendations
    }

    fn recommendation_index(&self, recommendation_id: &str) -> Result<usize> {
        self.recommendations
            .iter()
            .position(|r| r.id == recommendation_id)
            .ok_or_else(|| PrepError::RecommendationNotFound(recommendation_id.to_string()))
    }

    fn take_recommendation(&mut self, recommendation_id: &str) -> Result<RuleRecommendation> {
        let index = self.recommendation_index(recommendation_id)?;
        Ok(self.recommendations.remove(index))
    }

    /// Promote a pending recommendation into an enabled rule.
    ///
    /// The recommendation leaves the pending list, so a second accept fails
    /// with [`PrepError::RecommendationNotFound`]. A suggestion that fails
    /// [`BusinessRule::check`] is rejected and stays pending.
    pub fn accept_recommendation(&mut self, recommendation_id: &str) -> Result<&BusinessRule> {
        let index = self.recommendation_index(recommendation_id)?;
        let rule = self.recommendations[index].clone().into_rule();
        rule.check()?;
        self.recommendations.remove(index);
        log_changes!(
            self.verbosity(),
            "Accepted recommendation {} as {} rule {}",
            recommendation_id,
            rule.rule_type(),
            rule.id
        );
        Ok(self.push_rule(rule))
    }

    pub fn reject_recommendation(&mut self, recommendation_id: &str) -> Result<RuleRecommendation> {
        let rec = self.take_recommendation(recommendation_id)?;
        log_changes!(self.verbosity(), "Rejected recommendation {}", recommendation_id);
        Ok(rec)
    }

    // Rules

    pub fn rules(&self) -> &[BusinessRule] {
        &self.rules
    }

    pub fn rule(&self, rule_id: &str) -> Option<&BusinessRule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    fn push_rule(&mut self, rule: BusinessRule) -> &BusinessRule {
        let index = self.rules.len();
        self.rules.push(rule);
        &self.rules[index]
    }

    fn rule_mut(&mut self, rule_id: &str) -> Result<&mut BusinessRule> {
        self.rules
            .iter_mut()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| PrepError::RuleNotFound(rule_id.to_string()))
    }

    /// Add a rule after checking its parameters. Rule IDs must be unique.
    pub fn add_rule(&mut self, rule: BusinessRule) -> Result<&BusinessRule> {
        rule.check()?;
        if self.rule(&rule.id).is_some() {
            return Err(PrepError::InvalidRule(format!(
                "a rule with id {} already exists",
                rule.id
            )));
        }
        log_changes!(self.verbosity(), "Added {} rule {}", rule.rule_type(), rule.id);
        Ok(self.push_rule(rule))
    }

    /// Apply a partial edit. New parameters are checked before anything changes.
    pub fn update_rule(&mut self, rule_id: &str, update: RuleUpdate) -> Result<&BusinessRule> {
        if let Some(parameters) = &update.parameters {
            parameters.check()?;
        }
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(PrepError::InvalidRule("rule name is required".to_string()));
        }
        let verbosity = self.verbosity();
        let rule = self.rule_mut(rule_id)?;
        if let Some(name) = update.name {
            rule.name = name;
        }
        if let Some(description) = update.description {
            rule.description = description;
        }
        if let Some(parameters) = update.parameters {
            rule.parameters = parameters;
        }
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }
        log_changes!(verbosity, "Updated rule {}", rule_id);
        Ok(&*rule)
    }

    pub fn remove_rule(&mut self, rule_id: &str) -> Result<BusinessRule> {
        let index = self
            .rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| PrepError::RuleNotFound(rule_id.to_string()))?;
        log_changes!(self.verbosity(), "Removed rule {}", rule_id);
        Ok(self.rules.remove(index))
    }

    /// Flip a rule's enabled flag, returning the new state.
    pub fn toggle_rule(&mut self, rule_id: &str) -> Result<bool> {
        let rule = self.rule_mut(rule_id)?;
        rule.enabled = !rule.enabled;
        Ok(rule.enabled)
    }

    /// Parse a plain-English request and add the resulting rule.
    pub fn parse_rule(&mut self, text: &str) -> Result<&BusinessRule> {
        let rule = nl_rule::parse_rule(text, &self.dataset())?;
        self.add_rule(rule)
    }

    pub fn query(&self, text: &str) -> Result<QueryResult> {
        query::query(text, &self.dataset())
    }

    // Profiles

    pub fn profiles(&self) -> &[PrioritizationProfile] {
        &self.profiles
    }

    pub fn active_profile_id(&self) -> &str {
        &self.active_profile_id
    }

    pub fn active_profile(&self) -> Result<&PrioritizationProfile> {
        self.profile(&self.active_profile_id)
    }

    fn profile(&self, profile_id: &str) -> Result<&PrioritizationProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| PrepError::ProfileNotFound(profile_id.to_string()))
    }

    fn profile_mut(&mut self, profile_id: &str) -> Result<&mut PrioritizationProfile> {
        self.profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| PrepError::ProfileNotFound(profile_id.to_string()))
    }

    pub fn set_active_profile(&mut self, profile_id: &str) -> Result<()> {
        self.profile(profile_id)?;
        self.active_profile_id = profile_id.to_string();
        log_changes!(self.verbosity(), "Active profile is now {}", profile_id);
        Ok(())
    }

    pub fn update_profile_weight(
        &mut self,
        profile_id: &str,
        criterion_id: &str,
        weight: f64,
    ) -> Result<()> {
        self.profile_mut(profile_id)?.set_weight(criterion_id, weight)
    }

    pub fn normalize_profile(&mut self, profile_id: &str) -> Result<()> {
        self.profile_mut(profile_id)?.normalize();
        Ok(())
    }

    // Export

    /// Enabled rules as a pretty JSON document.
    pub fn export_rules(&self) -> Result<String> {
        export::render(&export::rules_document(&self.rules))
    }

    /// Active profile as a pretty JSON document.
    pub fn export_profile(&self) -> Result<String> {
        export::render(&export::profile_document(self.active_profile()?))
    }

    pub fn export_files(&self, options: &ExportOptions) -> Result<Vec<ExportFile>> {
        export::export_files(
            options,
            &self.clients,
            &self.workers,
            &self.tasks,
            &self.rules,
            self.active_profile()?,
        )
    }
}
