//! Configuration types for validation and rule mining.

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the validation passes.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub verbosity: u8,
}

/// Thresholds and confidences for the recommendation miners.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Minimum co-occurrence count for a task pair, whatever the client count
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub co_run_min_count: usize,
    /// Fraction of clients a pair must appear in (floored)
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub co_run_client_ratio: f64,
    /// Upper bound on co-run confidence
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub co_run_confidence_cap: f64,
    /// Average max load above this fraction of average slots triggers a load limit
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub load_ratio_trigger: f64,
    /// Suggested cap as a fraction of average available slots (floored)
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub load_cap_ratio: f64,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub load_confidence: f64,
    /// Skills held by at most this many workers are critical
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub critical_coverage: usize,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub skill_confidence: f64,
    /// Demand above this fraction of capacity marks a phase overloaded
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub phase_overload_ratio: f64,
    /// Alternative phases must have demand below this fraction of their capacity
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub phase_headroom_ratio: f64,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub max_alternative_phases: usize,
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub phase_confidence: f64,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[cfg_attr(feature = "python", pyo3(get, set))]
    pub verbosity: u8,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            co_run_min_count: 2,
            co_run_client_ratio: 0.3,
            co_run_confidence_cap: 0.95,
            load_ratio_trigger: 0.8,
            load_cap_ratio: 0.7,
            load_confidence: 0.75,
            critical_coverage: 1,
            skill_confidence: 0.8,
            phase_overload_ratio: 0.9,
            phase_headroom_ratio: 0.7,
            max_alternative_phases: 3,
            phase_confidence: 0.7,
            verbosity: 0,
        }
    }
}

impl MiningConfig {
    /// Co-occurrence count a task pair needs across `client_count` clients.
    pub fn co_run_threshold(&self, client_count: usize) -> usize {
        let scaled = (client_count as f64 * self.co_run_client_ratio).floor() as usize;
        self.co_run_min_count.max(scaled)
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl ValidationConfig {
    #[new]
    #[pyo3(signature = (verbosity=0))]
    fn py_new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    fn __repr__(&self) -> String {
        format!("ValidationConfig(verbosity={})", self.verbosity)
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl MiningConfig {
    /// Defaults for every threshold, optionally overridden from a JSON object.
    #[new]
    #[pyo3(signature = (json=None))]
    fn py_new(json: Option<&str>) -> PyResult<Self> {
        match json {
            Some(text) => serde_json::from_str(text)
                .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string())),
            None => Ok(Self::default()),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "MiningConfig(co_run_min_count={}, co_run_client_ratio={}, critical_coverage={})",
            self.co_run_min_count, self.co_run_client_ratio, self.critical_coverage
        )
    }
}
