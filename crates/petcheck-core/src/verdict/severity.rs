//! How much a failed check counts against a run
//!
//! Every [`FailureKind`](super::FailureKind) carries a default severity; the
//! verdict policy turns the worst surviving severity into the exit code.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Exit code when cases errored but no reported failure decides the run.
pub const EXIT_ERRORED: i32 = 3;

/// Severity of one failure, ordered from harmless to fatal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Kept in the report only
    Info,
    /// The body drifted from its registered schema while the asserted values held
    Warning,
    /// A contract assertion did not hold: status, text, body type, field value,
    /// unparseable JSON or a fixture the case could not create
    Error,
    /// No response at all, or a 5xx where the contract expects something else
    Critical,
}

impl Severity {
    /// Whether one failure at this level is enough to fail the run.
    ///
    /// Schema warnings count only in strict mode.
    #[must_use]
    pub const fn fails_run(self, strict: bool) -> bool {
        match self {
            Self::Info => false,
            Self::Warning => strict,
            Self::Error | Self::Critical => true,
        }
    }

    /// Exit code this level contributes; 0 when it does not fail the run.
    #[must_use]
    pub const fn exit_code(self, strict: bool) -> i32 {
        match self {
            _ if !self.fails_run(strict) => 0,
            Self::Critical => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Info, Self::Warning, Self::Error, Self::Critical]
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| {
                format!("unknown severity '{s}' (expected info, warning, error or critical)")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::FailureKind;

    #[test]
    fn schema_drift_fails_only_strict_runs() {
        let level = FailureKind::SchemaViolation.default_severity();
        assert_eq!(level, Severity::Warning);
        assert!(level.fails_run(true));
        assert!(!level.fails_run(false));
        assert_eq!(level.exit_code(true), 1);
        assert_eq!(level.exit_code(false), 0);
    }

    #[test]
    fn assertion_kinds_exit_one_in_both_modes() {
        for kind in [
            FailureKind::StatusMismatch,
            FailureKind::TextMismatch,
            FailureKind::ValueMismatch,
            FailureKind::BodyType,
            FailureKind::MalformedJson,
            FailureKind::FixtureFailed,
        ] {
            for strict in [true, false] {
                assert_eq!(kind.default_severity().exit_code(strict), 1, "{kind:?}");
            }
        }
    }

    #[test]
    fn unreachable_server_exits_two() {
        let level = FailureKind::Transport.default_severity();
        assert_eq!(level, Severity::Critical);
        assert_eq!(level.exit_code(false), 2);
    }

    #[test]
    fn info_never_fails_and_errored_code_is_distinct() {
        assert_eq!(Severity::Info.exit_code(true), 0);
        assert!(
            [Severity::Warning, Severity::Error, Severity::Critical]
                .iter()
                .all(|s| s.exit_code(true) != EXIT_ERRORED)
        );
    }

    #[test]
    fn min_severity_floor_orders_levels() {
        let mut levels = vec![Severity::Critical, Severity::Info, Severity::Error, Severity::Warning];
        levels.sort();
        assert_eq!(
            levels,
            [Severity::Info, Severity::Warning, Severity::Error, Severity::Critical]
        );
    }

    #[test]
    fn parses_cli_names() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        let err = "fatal".parse::<Severity>().unwrap_err();
        assert!(err.contains("expected info, warning"));
    }
}
