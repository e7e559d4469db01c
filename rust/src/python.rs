//! PyO3 bindings.
//!
//! Tables, findings and recommendations cross the boundary as JSON text in the
//! same shapes the export documents use. Rules come back as [`PyBusinessRule`]
//! so the host gets a real `datetime` for `created_at`.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::{DateTime, Utc};
use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{MiningConfig, ValidationConfig};
use crate::error::PrepError;
use crate::export::ExportOptions;
use crate::models::{Client, Dataset, Task, Worker};
use crate::recommend::mine_recommendations_with;
use crate::rules::BusinessRule;
use crate::session::{RuleUpdate, Session};
use crate::validation::validate_with;

impl From<PrepError> for PyErr {
    fn from(err: PrepError) -> PyErr {
        match err {
            PrepError::RecommendationNotFound(_)
            | PrepError::RuleNotFound(_)
            | PrepError::ProfileNotFound(_)
            | PrepError::CriterionNotFound(_) => PyKeyError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

fn from_json<T: DeserializeOwned>(text: &str) -> PyResult<T> {
    serde_json::from_str(text).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// An accepted or authored rule (PyO3 wrapper).
#[pyclass(name = "BusinessRule")]
#[derive(Clone, Debug)]
pub struct PyBusinessRule {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub description: String,
    /// Kebab-case kind, e.g. `"co-run"`.
    #[pyo3(get)]
    pub rule_type: String,
    /// The `parameters` object as JSON.
    #[pyo3(get)]
    pub parameters: String,
    #[pyo3(get)]
    pub enabled: bool,
    #[pyo3(get)]
    pub created_at: DateTime<Utc>,
    #[pyo3(get)]
    pub source: String,
}

impl PyBusinessRule {
    fn from_rule(rule: &BusinessRule) -> PyResult<Self> {
        let value = serde_json::to_value(rule).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            description: rule.description.clone(),
            rule_type: rule.rule_type().to_string(),
            parameters: value["parameters"].to_string(),
            enabled: rule.enabled,
            created_at: rule.created_at,
            source: value["source"].as_str().unwrap_or_default().to_string(),
        })
    }
}

#[pymethods]
impl PyBusinessRule {
    fn __repr__(&self) -> String {
        format!(
            "BusinessRule(id={:?}, type={:?}, name={:?}, enabled={})",
            self.id, self.rule_type, self.name, self.enabled
        )
    }
}

/// Working state for one data-preparation session.
#[pyclass(name = "Session")]
pub struct PySession {
    inner: Session,
}

#[pymethods]
impl PySession {
    #[new]
    #[pyo3(signature = (validation_config=None, mining_config=None))]
    fn new(
        validation_config: Option<ValidationConfig>,
        mining_config: Option<MiningConfig>,
    ) -> Self {
        Self {
            inner: Session::with_config(
                validation_config.unwrap_or_default(),
                mining_config.unwrap_or_default(),
            ),
        }
    }

    /// Load clients from a JSON array of records.
    fn set_clients(&mut self, json: &str) -> PyResult<()> {
        self.inner.set_clients(from_json(json)?);
        Ok(())
    }

    fn set_workers(&mut self, json: &str) -> PyResult<()> {
        self.inner.set_workers(from_json(json)?);
        Ok(())
    }

    fn set_tasks(&mut self, json: &str) -> PyResult<()> {
        self.inner.set_tasks(from_json(json)?);
        Ok(())
    }

    /// Validate the loaded tables; returns the findings as JSON.
    fn run_validation(&mut self) -> PyResult<String> {
        to_json(&self.inner.run_validation().findings)
    }

    fn is_allocation_ready(&self) -> bool {
        self.inner.report().is_allocation_ready()
    }

    /// Mine fresh recommendations; returns them as JSON.
    fn refresh_recommendations(&mut self) -> PyResult<String> {
        to_json(self.inner.refresh_recommendations())
    }

    fn accept_recommendation(&mut self, recommendation_id: &str) -> PyResult<PyBusinessRule> {
        PyBusinessRule::from_rule(self.inner.accept_recommendation(recommendation_id)?)
    }

    fn reject_recommendation(&mut self, recommendation_id: &str) -> PyResult<()> {
        self.inner.reject_recommendation(recommendation_id)?;
        Ok(())
    }

    fn rules(&self) -> PyResult<Vec<PyBusinessRule>> {
        self.inner.rules().iter().map(PyBusinessRule::from_rule).collect()
    }

    /// Add a rule given in its exported JSON shape.
    fn add_rule(&mut self, json: &str) -> PyResult<PyBusinessRule> {
        let rule: BusinessRule = from_json(json)?;
        PyBusinessRule::from_rule(self.inner.add_rule(rule)?)
    }

    /// Apply a partial edit, e.g. `{"name": "...", "enabled": false}`.
    fn update_rule(&mut self, rule_id: &str, json: &str) -> PyResult<PyBusinessRule> {
        let update: RuleUpdate = from_json(json)?;
        PyBusinessRule::from_rule(self.inner.update_rule(rule_id, update)?)
    }

    fn remove_rule(&mut self, rule_id: &str) -> PyResult<()> {
        self.inner.remove_rule(rule_id)?;
        Ok(())
    }

    fn toggle_rule(&mut self, rule_id: &str) -> PyResult<bool> {
        Ok(self.inner.toggle_rule(rule_id)?)
    }

    /// Parse a plain-English rule request and add the result.
    fn parse_rule(&mut self, text: &str) -> PyResult<PyBusinessRule> {
        PyBusinessRule::from_rule(self.inner.parse_rule(text)?)
    }

    /// Answer a plain-English question; returns a JSON query result.
    fn query(&self, text: &str) -> PyResult<String> {
        to_json(&self.inner.query(text)?)
    }

    fn active_profile_id(&self) -> String {
        self.inner.active_profile_id().to_string()
    }

    fn set_active_profile(&mut self, profile_id: &str) -> PyResult<()> {
        Ok(self.inner.set_active_profile(profile_id)?)
    }

    fn update_profile_weight(
        &mut self,
        profile_id: &str,
        criterion_id: &str,
        weight: f64,
    ) -> PyResult<()> {
        Ok(self
            .inner
            .update_profile_weight(profile_id, criterion_id, weight)?)
    }

    fn normalize_profile(&mut self, profile_id: &str) -> PyResult<()> {
        Ok(self.inner.normalize_profile(profile_id)?)
    }

    fn export_rules(&self) -> PyResult<String> {
        Ok(self.inner.export_rules()?)
    }

    fn export_profile(&self) -> PyResult<String> {
        Ok(self.inner.export_profile()?)
    }

    /// All export artifacts as `(filename, content)` pairs.
    #[pyo3(signature = (include_cleaned_data=true, include_rules=true, include_prioritization=true))]
    fn export_files(
        &self,
        include_cleaned_data: bool,
        include_rules: bool,
        include_prioritization: bool,
    ) -> PyResult<Vec<(String, String)>> {
        let options = ExportOptions {
            include_cleaned_data,
            include_rules,
            include_prioritization,
        };
        Ok(self
            .inner
            .export_files(&options)?
            .into_iter()
            .map(|f| (f.filename, f.content))
            .collect())
    }

    fn __repr__(&self) -> String {
        format!(
            "Session(clients={}, workers={}, tasks={}, rules={}, recommendations={})",
            self.inner.clients().len(),
            self.inner.workers().len(),
            self.inner.tasks().len(),
            self.inner.rules().len(),
            self.inner.recommendations().len()
        )
    }
}

/// Validate three JSON tables without a session.
///
/// # Returns
/// * JSON array of findings, grouped by entity type then row
///
/// # Raises
/// * ValueError if any table is not a JSON array of records
#[pyfunction]
#[pyo3(signature = (clients, workers, tasks, config=None))]
fn validate(
    clients: &str,
    workers: &str,
    tasks: &str,
    config: Option<ValidationConfig>,
) -> PyResult<String> {
    let clients: Vec<Client> = from_json(clients)?;
    let workers: Vec<Worker> = from_json(workers)?;
    let tasks: Vec<Task> = from_json(tasks)?;
    let findings = validate_with(
        &Dataset::new(&clients, &workers, &tasks),
        &config.unwrap_or_default(),
    );
    to_json(&findings)
}

/// Mine rule recommendations from three JSON tables without a session.
#[pyfunction]
#[pyo3(signature = (clients, workers, tasks, config=None))]
fn mine_recommendations(
    clients: &str,
    workers: &str,
    tasks: &str,
    config: Option<MiningConfig>,
) -> PyResult<String> {
    let clients: Vec<Client> = from_json(clients)?;
    let workers: Vec<Worker> = from_json(workers)?;
    let tasks: Vec<Task> = from_json(tasks)?;
    let recs = mine_recommendations_with(
        &Dataset::new(&clients, &workers, &tasks),
        &config.unwrap_or_default(),
    );
    to_json(&recs)
}

/// The alloc_prep Python module.
#[pymodule]
fn alloc_prep(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<PyBusinessRule>()?;
    m.add_class::<PySession>()?;

    // Config types
    m.add_class::<ValidationConfig>()?;
    m.add_class::<MiningConfig>()?;

    // Engine
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    m.add_function(wrap_pyfunction!(mine_recommendations, m)?)?;

    Ok(())
}
