//! Failure kinds and structured representation

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Severity;

/// Kind of failure - determines default severity.
///
/// Shape problems (`SchemaViolation`, `BodyType`) are kept apart from value
/// problems (`ValueMismatch`, `TextMismatch`) so both are reportable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Status code differs from the expected one
    StatusMismatch,
    /// Plain-text body differs from the expected text
    TextMismatch,
    /// A JSON field differs from the value sent or expected
    ValueMismatch,
    /// Body is not of the expected JSON type (list vs object, ...)
    BodyType,
    /// Body does not conform to the registered JSON schema
    SchemaViolation,
    /// Body expected to be JSON could not be parsed
    MalformedJson,
    /// Request never got a response (connect, timeout, ...)
    Transport,
    /// Precondition entity could not be created
    FixtureFailed,
}

impl FailureKind {
    pub const ALL: [Self; 8] = [
        Self::StatusMismatch,
        Self::TextMismatch,
        Self::ValueMismatch,
        Self::BodyType,
        Self::SchemaViolation,
        Self::MalformedJson,
        Self::Transport,
        Self::FixtureFailed,
    ];

    /// Wire name, as serialized in reports and accepted by `--ignore-kind`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusMismatch => "status_mismatch",
            Self::TextMismatch => "text_mismatch",
            Self::ValueMismatch => "value_mismatch",
            Self::BodyType => "body_type",
            Self::SchemaViolation => "schema_violation",
            Self::MalformedJson => "malformed_json",
            Self::Transport => "transport",
            Self::FixtureFailed => "fixture_failed",
        }
    }

    /// Default severity for this failure kind
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::Transport => Severity::Critical,
            Self::SchemaViolation => Severity::Warning,
            Self::StatusMismatch
            | Self::TextMismatch
            | Self::ValueMismatch
            | Self::BodyType
            | Self::MalformedJson
            | Self::FixtureFailed => Severity::Error,
        }
    }

    /// Whether this kind aborts the case as an error rather than an assertion failure.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::Transport | Self::MalformedJson | Self::FixtureFailed
        )
    }

    /// Human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::StatusMismatch => "Unexpected status code",
            Self::TextMismatch => "Unexpected response text",
            Self::ValueMismatch => "Response field does not match",
            Self::BodyType => "Unexpected response body type",
            Self::SchemaViolation => "Response does not match JSON schema",
            Self::MalformedJson => "Response body is not valid JSON",
            Self::Transport => "Request failed before a response arrived",
            Self::FixtureFailed => "Fixture setup failed",
        }
    }
}

impl std::str::FromStr for FailureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown failure kind '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Snapshot of HTTP request for reproduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Snapshot of HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Failure {
    /// Case the check belongs to
    #[serde(default)]
    pub case: String,
    /// Step label the check ran in
    #[serde(default)]
    pub step: String,
    /// Kind of failure
    pub kind: FailureKind,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message naming what mismatched
    pub message: String,
    /// Expected value, rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value, rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Request that produced the response (if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSnapshot>,
    /// Response received (if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
}

impl Failure {
    /// Create a failure with the kind's default severity
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            case: String::new(),
            step: String::new(),
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            expected: None,
            actual: None,
            request: None,
            response: None,
        }
    }

    /// Status code mismatch; a 5xx the case did not ask for is critical.
    #[must_use]
    pub fn status_mismatch(expected: u16, actual: u16) -> Self {
        let failure = Self::new(
            FailureKind::StatusMismatch,
            format!("status code {actual} does not match expected {expected}"),
        )
        .with_expected(expected.to_string())
        .with_actual(actual.to_string());

        if (500..600).contains(&actual) && !(500..600).contains(&expected) {
            failure.with_severity(Severity::Critical)
        } else {
            failure
        }
    }

    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    #[must_use]
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Attach the request/response pair the check looked at
    #[must_use]
    pub fn with_exchange(mut self, request: RequestSnapshot, response: ResponseSnapshot) -> Self {
        self.request = Some(request);
        self.response = Some(response);
        self
    }

    /// Attach the request only (no response arrived)
    #[must_use]
    pub fn with_request(mut self, request: RequestSnapshot) -> Self {
        self.request = Some(request);
        self
    }

    /// Locate the failure in a case step
    #[must_use]
    pub fn in_step(mut self, case: impl Into<String>, step: impl Into<String>) -> Self {
        self.case = case.into();
        self.step = step.into();
        self
    }

    /// Override severity
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        match (&self.expected, &self.actual) {
            (Some(e), Some(a)) => write!(f, " (expected {e}, got {a})"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_serialized_form() {
        for kind in FailureKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
            assert_eq!(kind.as_str().parse::<FailureKind>(), Ok(kind));
        }
        assert!("server_error".parse::<FailureKind>().is_err());
    }

    fn sample_request() -> RequestSnapshot {
        RequestSnapshot {
            method: "POST".to_string(),
            url: "http://localhost:8080/api/v3/pet".to_string(),
            headers: HashMap::new(),
            body: Some(r#"{"id":1,"name":"Buddy","status":"available"}"#.to_string()),
        }
    }

    #[test]
    fn kind_severity_mapping() {
        assert_eq!(
            FailureKind::Transport.default_severity(),
            Severity::Critical
        );
        assert_eq!(
            FailureKind::SchemaViolation.default_severity(),
            Severity::Warning
        );
        assert_eq!(
            FailureKind::ValueMismatch.default_severity(),
            Severity::Error
        );
        assert_eq!(
            FailureKind::StatusMismatch.default_severity(),
            Severity::Error
        );
    }

    #[test]
    fn shape_and_value_kinds_are_distinct() {
        let shape = Failure::new(FailureKind::SchemaViolation, "id: \"1\" is not of type integer");
        let value = Failure::new(FailureKind::ValueMismatch, "id does not match");
        assert_ne!(shape.kind, value.kind);
        assert!(!shape.kind.is_error());
        assert!(!value.kind.is_error());
    }

    #[test]
    fn status_mismatch_4xx_is_error() {
        let f = Failure::status_mismatch(200, 404);
        assert_eq!(f.kind, FailureKind::StatusMismatch);
        assert_eq!(f.severity, Severity::Error);
        assert_eq!(f.expected.as_deref(), Some("200"));
        assert_eq!(f.actual.as_deref(), Some("404"));
    }

    #[test]
    fn status_mismatch_unexpected_5xx_is_critical() {
        assert_eq!(
            Failure::status_mismatch(200, 500).severity,
            Severity::Critical
        );
        assert_eq!(
            Failure::status_mismatch(404, 502).severity,
            Severity::Critical
        );
    }

    #[test]
    fn display_includes_expected_and_actual() {
        let f = Failure::status_mismatch(404, 200);
        assert_eq!(
            f.to_string(),
            "status code 200 does not match expected 404 (expected 404, got 200)"
        );
    }

    #[test]
    fn builder_pattern() {
        let f = Failure::new(FailureKind::Transport, "connection refused")
            .with_request(sample_request())
            .in_step("add_pet", "Send create pet request")
            .with_severity(Severity::Error);

        assert_eq!(f.case, "add_pet");
        assert_eq!(f.step, "Send create pet request");
        assert_eq!(f.severity, Severity::Error);
        assert!(f.response.is_none());
        assert_eq!(f.request.unwrap().method, "POST");
    }

    #[test]
    fn failure_serializes_kind_snake_case() {
        let f = Failure::new(FailureKind::SchemaViolation, "bad shape");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "schema_violation");
        assert_eq!(json["severity"], "warning");
        assert!(json.get("request").is_none());
    }
}
