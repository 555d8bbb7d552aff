//! Verdict policy - determines how failures are filtered and judged

use super::{EXIT_ERRORED, Failure, FailureKind, Severity};

/// Policy for filtering and judging failures
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    /// Strict mode: warnings become errors
    pub strict: bool,
    /// Failure kinds to ignore
    pub ignore_kinds: Vec<FailureKind>,
    /// Minimum severity to report (below this = ignored)
    pub min_severity: Severity,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            strict: true,
            ignore_kinds: vec![],
            min_severity: Severity::Warning,
        }
    }
}

impl VerdictPolicy {
    /// Create a lenient policy (warnings don't fail)
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Default::default()
        }
    }

    /// Filter failures according to policy
    #[must_use]
    pub fn filter(&self, failures: Vec<Failure>) -> Vec<Failure> {
        failures
            .into_iter()
            .filter(|f| self.should_report(f))
            .collect()
    }

    fn should_report(&self, failure: &Failure) -> bool {
        if self.ignore_kinds.contains(&failure.kind) {
            return false;
        }
        failure.severity >= self.min_severity
    }

    /// Exit code for a set of reported failures.
    ///
    /// The highest severity wins; errored cases with nothing else to report
    /// yield [`EXIT_ERRORED`].
    #[must_use]
    pub fn exit_code(&self, failures: &[Failure], has_errors: bool) -> i32 {
        let failure_code = failures
            .iter()
            .map(|f| f.severity.exit_code(self.strict))
            .max()
            .unwrap_or(0);

        if failure_code > 0 {
            return failure_code;
        }

        if has_errors {
            return EXIT_ERRORED;
        }

        0
    }

    /// Determine verdict from case counts and the failures left after [`Self::filter`].
    ///
    /// PASS requires at least one case, no errored case, and no reported
    /// failure that fails the run under this policy. A case failed only by
    /// ignored kinds or by warnings in lenient mode does not fail the run.
    #[must_use]
    pub fn verdict(&self, failures: &[Failure], total: u64, passed: u64, errored: u64) -> Verdict {
        let has_errors = errored > 0;
        if total == 0 {
            return Verdict {
                status: VerdictStatus::Fail,
                exit_code: EXIT_ERRORED,
                reason: "No cases were run".to_string(),
            };
        }

        let exit_code = self.exit_code(failures, has_errors);
        let status = if exit_code == 0 {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };

        let reason = if passed == total {
            format!("All {total} cases passed")
        } else {
            let mut parts = vec![format!("{passed}/{total} cases passed")];
            if !failures.is_empty() {
                let count = |s: Severity| failures.iter().filter(|f| f.severity == s).count();
                parts.push(format!(
                    "{} failures ({} critical, {} error, {} warning)",
                    failures.len(),
                    count(Severity::Critical),
                    count(Severity::Error),
                    count(Severity::Warning)
                ));
            }
            if has_errors {
                parts.push(format!("{errored} errored"));
            }
            if status == VerdictStatus::Pass {
                parts.push("nothing reported fails the run".to_string());
            }
            parts.join("; ")
        };

        Verdict {
            status,
            exit_code,
            reason,
        }
    }
}

/// Final verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}
