//! Case context and step annotator
//!
//! A case runs as a sequence of labelled steps. Each step is timed, logged
//! under its own span, and recorded in the case report. Recording is purely
//! observational: the step's result is returned untouched.

use std::time::Instant;

use tracing::{info, info_span, warn};

use petcheck_core::{Config, Failure, FailureKind, StepRecord, StepStatus};

use crate::client::{ClientError, PetStoreClient};
use crate::ids::IdAllocator;

/// Why a case stopped.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    /// One assertion did not hold
    #[error("{0}")]
    Check(Box<Failure>),
    /// Several independent field checks did not hold
    #[error("{} checks failed", .0.len())]
    Checks(Vec<Failure>),
    #[error(transparent)]
    Client(#[from] ClientError),
    /// A precondition entity could not be created
    #[error("fixture failed: {0}")]
    Fixture(Box<Failure>),
}

impl From<Failure> for CaseError {
    fn from(failure: Failure) -> Self {
        Self::Check(Box::new(failure))
    }
}

impl CaseError {
    /// Transport, malformed body or fixture failure, as opposed to an
    /// assertion that did not hold.
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self {
            Self::Check(f) => f.kind.is_error(),
            Self::Checks(fs) => fs.iter().any(|f| f.kind.is_error()),
            Self::Client(_) | Self::Fixture(_) => true,
        }
    }

    /// Report form of this error.
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        match self {
            Self::Check(f) | Self::Fixture(f) => vec![f.as_ref().clone()],
            Self::Checks(fs) => fs.clone(),
            Self::Client(e) => vec![e.to_failure()],
        }
    }
}

/// `Ok` when no check failed.
///
/// # Errors
///
/// Returns every collected failure as one `Checks` error.
pub fn all_hold(failures: Vec<Failure>) -> Result<(), CaseError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(CaseError::Checks(failures))
    }
}

/// Entity created during a case, deleted afterwards when teardown is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    Pet(i64),
    Order(i64),
}

/// Everything a running case can reach, plus what it has recorded so far.
pub struct CaseContext<'a> {
    client: &'a PetStoreClient,
    ids: &'a IdAllocator,
    config: &'a Config,
    case: String,
    steps: Vec<StepRecord>,
    failures: Vec<Failure>,
    cleanup: Vec<Cleanup>,
    depth: usize,
    error_recorded: bool,
}

impl<'a> CaseContext<'a> {
    #[must_use]
    pub fn new(
        case: impl Into<String>,
        client: &'a PetStoreClient,
        ids: &'a IdAllocator,
        config: &'a Config,
    ) -> Self {
        Self {
            client,
            ids,
            config,
            case: case.into(),
            steps: Vec::new(),
            failures: Vec::new(),
            cleanup: Vec::new(),
            depth: 0,
            error_recorded: false,
        }
    }

    #[must_use]
    pub fn client(&self) -> &'a PetStoreClient {
        self.client
    }

    #[must_use]
    pub fn ids(&self) -> &'a IdAllocator {
        self.ids
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Run one labelled phase of the case.
    ///
    /// The failure of a nested step is recorded once, under the innermost label.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn step<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Self) -> Result<T, CaseError>,
    ) -> Result<T, CaseError> {
        let span = info_span!("step", label);
        let _enter = span.enter();

        if self.depth == 0 {
            self.error_recorded = false;
        }
        self.depth += 1;
        let start = Instant::now();
        let result = f(self);
        let elapsed = start.elapsed().as_secs_f64();
        self.depth -= 1;

        let status = match &result {
            Ok(_) => {
                info!(elapsed, "passed");
                StepStatus::Passed
            }
            Err(e) => {
                warn!(error = %e, "failed");
                if !self.error_recorded {
                    self.record(label, e);
                    self.error_recorded = true;
                }
                if e.is_error() {
                    StepStatus::Errored
                } else {
                    StepStatus::Failed
                }
            }
        };

        self.steps.push(StepRecord {
            label: label.to_string(),
            status,
            elapsed,
        });
        result
    }

    /// Record an error raised outside any step.
    pub fn record_unstepped(&mut self, err: &CaseError) {
        if self.failures.is_empty() {
            self.record("(case)", err);
        }
    }

    fn record(&mut self, label: &str, err: &CaseError) {
        let case = self.case.clone();
        self.failures
            .extend(err.failures().into_iter().map(|f| f.in_step(&case, label)));
    }

    /// Remember an entity for teardown.
    pub fn register(&mut self, entity: Cleanup) {
        self.cleanup.push(entity);
    }

    /// Delete registered entities, newest first.
    ///
    /// Best-effort: problems are logged and never change the case outcome.
    pub fn teardown(&mut self) {
        while let Some(entity) = self.cleanup.pop() {
            let result = match entity {
                Cleanup::Pet(id) => self.client.delete_pet(id),
                Cleanup::Order(id) => self.client.delete_order(id),
            };
            match result {
                Ok(resp) if resp.status == 200 || resp.status == 404 => {
                    info!(?entity, status = resp.status, "teardown");
                }
                Ok(resp) => warn!(?entity, status = resp.status, "teardown returned unexpected status"),
                Err(e) => warn!(?entity, error = %e, "teardown failed"),
            }
        }
    }

    /// Consume the context, yielding what it recorded.
    #[must_use]
    pub fn into_records(self) -> (Vec<StepRecord>, Vec<Failure>) {
        (self.steps, self.failures)
    }
}

/// Failure for a precondition entity that could not be created.
#[must_use]
pub fn fixture_failure(message: impl Into<String>) -> Failure {
    Failure::new(FailureKind::FixtureFailed, message)
}
