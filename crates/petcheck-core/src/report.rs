//! Run report: per-case outcome with the steps it went through
//!
//! The JSON form of [`SuiteReport`] is the machine-readable output of
//! `petcheck run --output json`; its schema is exported by `petcheck schema report`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::verdict::Failure;

/// Which group of scenarios a case belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Pet,
    Store,
}

impl Suite {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pet => "pet",
            Self::Store => "store",
        }
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Errored,
}

/// One annotated phase of a case ("Send create pet request", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepRecord {
    pub label: String,
    pub status: StepStatus,
    /// Wall time of the step in seconds
    pub elapsed: f64,
}

/// Outcome of a whole case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// Every check held
    Passed,
    /// At least one assertion did not hold
    Failed,
    /// Transport, malformed body or fixture failure aborted the case
    Errored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaseReport {
    pub suite: Suite,
    /// Stable identifier, e.g. `get_pets_by_status[sold]`
    pub name: String,
    /// Human-readable title
    pub title: String,
    pub status: CaseStatus,
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub failures: Vec<Failure>,
    /// Wall time of the case in seconds
    pub elapsed: f64,
}

/// Top-level report of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteReport {
    /// Base URL the run targeted
    pub base_url: String,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub errored: u64,
    pub cases: Vec<CaseReport>,
    /// Set when `stop_on_failure` cut the run short
    #[serde(default)]
    pub stopped_early: bool,
}

impl SuiteReport {
    /// All failures across cases, in run order.
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        self.cases
            .iter()
            .flat_map(|c| c.failures.iter().cloned())
            .collect()
    }
}

/// Generate JSON Schema for the report format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(SuiteReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
