//! Suite runner: executes selected catalog cases one after another
//!
//! Cases run sequentially against one shared server. A failed or errored
//! case never stops the run unless `stop_on_failure` is set.

use std::time::Instant;

use tracing::{info, info_span, warn};

use petcheck_core::{CaseReport, CaseStatus, Config, Suite, SuiteReport};

use crate::catalog::{self, TestCase};
use crate::client::{ClientError, PetStoreClient};
use crate::context::CaseContext;
use crate::ids::IdAllocator;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("No cases match the selection")]
    NoCases,
}

/// Accumulates case reports into run totals.
#[derive(Default)]
struct RunAccumulator {
    cases: Vec<CaseReport>,
    passed: u64,
    failed: u64,
    errored: u64,
}

impl RunAccumulator {
    /// Record one case; returns whether it did not pass.
    fn record(&mut self, report: CaseReport) -> bool {
        match report.status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Failed => self.failed += 1,
            CaseStatus::Errored => self.errored += 1,
        }
        let failed = report.status != CaseStatus::Passed;
        self.cases.push(report);
        failed
    }

    fn into_report(self, base_url: String, stopped_early: bool) -> SuiteReport {
        SuiteReport {
            base_url,
            total: u64::try_from(self.cases.len()).unwrap_or(u64::MAX),
            passed: self.passed,
            failed: self.failed,
            errored: self.errored,
            cases: self.cases,
            stopped_early,
        }
    }
}

/// Runs catalog cases against the server named by a [`Config`].
pub struct SuiteRunner {
    config: Config,
    /// Empty means every suite
    suites: Vec<Suite>,
    /// Substring a case name must contain
    filter: Option<String>,
    stop_on_failure: bool,
}

impl SuiteRunner {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
            suites: Vec::new(),
            filter: None,
            stop_on_failure: false,
        }
    }

    #[must_use]
    pub fn with_suites(mut self, suites: Vec<Suite>) -> Self {
        self.suites = suites;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Cases selected by suite and filter, in catalog order. No requests are sent.
    #[must_use]
    pub fn plan(&self) -> Vec<TestCase> {
        catalog::all()
            .into_iter()
            .filter(|c| self.suites.is_empty() || self.suites.contains(&c.suite))
            .filter(|c| self.filter.as_deref().is_none_or(|f| c.name.contains(f)))
            .collect()
    }

    /// Run every selected case.
    ///
    /// # Errors
    ///
    /// Returns error if nothing is selected or the HTTP client cannot be built.
    /// Case failures are reported, not returned.
    pub fn run(&self) -> Result<SuiteReport, RunnerError> {
        let cases = self.plan();
        if cases.is_empty() {
            return Err(RunnerError::NoCases);
        }

        let client = PetStoreClient::from_config(&self.config)?;
        let ids = IdAllocator::new(self.config.ids, self.config.seed);
        info!(
            base_url = client.base_url(),
            cases = cases.len(),
            ids = ?self.config.ids,
            "starting run"
        );

        let mut acc = RunAccumulator::default();
        let mut stopped_early = false;
        for (idx, case) in cases.iter().enumerate() {
            let report = run_case(case, &client, &ids, &self.config);
            if acc.record(report) && self.stop_on_failure {
                stopped_early = idx + 1 < cases.len();
                if stopped_early {
                    warn!(case = %case.name, "stopping on first failure");
                }
                break;
            }
        }

        Ok(acc.into_report(client.base_url().to_string(), stopped_early))
    }
}

/// Run one case in its own context and report what happened.
///
/// Failures never panic or propagate; they end up in the returned report.
pub fn run_case(
    case: &TestCase,
    client: &PetStoreClient,
    ids: &IdAllocator,
    config: &Config,
) -> CaseReport {
    let span = info_span!("case", name = %case.name);
    let _enter = span.enter();

    let start = Instant::now();
    let mut ctx = CaseContext::new(case.name.as_str(), client, ids, config);
    let result = case.run(&mut ctx);
    if let Err(e) = &result {
        ctx.record_unstepped(e);
    }
    if config.teardown {
        ctx.teardown();
    }
    let elapsed = start.elapsed().as_secs_f64();

    let (steps, failures) = ctx.into_records();
    let status = match &result {
        Err(e) if e.is_error() => CaseStatus::Errored,
        Err(_) => CaseStatus::Failed,
        Ok(()) if failures.is_empty() => CaseStatus::Passed,
        Ok(()) => CaseStatus::Failed,
    };
    info!(?status, elapsed, "case finished");

    CaseReport {
        suite: case.suite,
        name: case.name.clone(),
        title: case.title.clone(),
        status,
        steps,
        failures,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petcheck_core::{Failure, StepRecord, StepStatus};

    fn runner() -> SuiteRunner {
        SuiteRunner::from_config(&Config::default())
    }

    fn names(cases: &[TestCase]) -> Vec<&str> {
        cases.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn plan_defaults_to_every_case() {
        assert_eq!(runner().plan().len(), catalog::all().len());
    }

    #[test]
    fn plan_by_suite() {
        let plan = runner().with_suites(vec![Suite::Store]).plan();
        assert_eq!(
            names(&plan),
            vec![
                "post_placing_order",
                "get_order_by_id",
                "delete_order_by_id",
                "get_information_nonexistent_order",
                "get_store_inventory",
            ]
        );
    }

    #[test]
    fn plan_by_filter_substring() {
        let plan = runner().with_filter(Some("nonexistent".into())).plan();
        assert_eq!(
            names(&plan),
            vec![
                "delete_nonexistent_pet",
                "update_nonexistent_pet",
                "get_information_nonexistent_pet",
                "get_information_nonexistent_order",
            ]
        );
    }

    #[test]
    fn suite_and_filter_combine() {
        let plan = runner()
            .with_suites(vec![Suite::Pet])
            .with_filter(Some("order".into()))
            .plan();
        assert!(plan.is_empty());
    }

    #[test]
    fn empty_selection_is_an_error() {
        let err = runner().with_filter(Some("no_such_case".into())).run().unwrap_err();
        assert!(matches!(err, RunnerError::NoCases));
    }

    fn report(status: CaseStatus) -> CaseReport {
        CaseReport {
            suite: Suite::Pet,
            name: "add_pet".into(),
            title: "Add a new pet".into(),
            status,
            steps: vec![StepRecord {
                label: "Send create pet request".into(),
                status: StepStatus::Passed,
                elapsed: 0.0,
            }],
            failures: match status {
                CaseStatus::Passed => vec![],
                _ => vec![Failure::status_mismatch(200, 500)],
            },
            elapsed: 0.0,
        }
    }

    #[test]
    fn accumulator_counts_outcomes() {
        let mut acc = RunAccumulator::default();
        assert!(!acc.record(report(CaseStatus::Passed)));
        assert!(acc.record(report(CaseStatus::Failed)));
        assert!(acc.record(report(CaseStatus::Errored)));
        assert!(!acc.record(report(CaseStatus::Passed)));

        let out = acc.into_report("http://localhost:8080/api/v3".into(), false);
        assert_eq!((out.total, out.passed, out.failed, out.errored), (4, 2, 1, 1));
        assert_eq!(out.failures().len(), 2);
    }
}
