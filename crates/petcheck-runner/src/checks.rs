//! Response assertions
//!
//! No I/O. Each check either holds or returns a [`Failure`] naming what
//! mismatched. Shape checks (schema, body type) and value checks (status,
//! text, fields) produce different failure kinds.

use petcheck_core::{Failure, FailureKind, SchemaKind};

use crate::client::ApiResponse;

/// Maximum schema errors listed in one failure
const MAX_SCHEMA_ERRORS: usize = 5;

/// Top-level JSON type of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    List,
    Object,
}

impl JsonType {
    #[must_use]
    pub fn of(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "list",
            serde_json::Value::Object(_) => "object",
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Object => "object",
        }
    }

    fn matches(self, value: &serde_json::Value) -> bool {
        match self {
            Self::List => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Status code equals `expected`.
pub fn expect_status(resp: &ApiResponse, expected: u16) -> Result<(), Failure> {
    if resp.status == expected {
        return Ok(());
    }
    Err(resp.attach(Failure::status_mismatch(expected, resp.status)))
}

/// Body text equals `expected` exactly.
pub fn expect_text(resp: &ApiResponse, expected: &str) -> Result<(), Failure> {
    if resp.text() == expected {
        return Ok(());
    }
    Err(resp.attach(
        Failure::new(
            FailureKind::TextMismatch,
            "response text does not match".to_string(),
        )
        .with_expected(format!("{expected:?}"))
        .with_actual(format!("{:?}", resp.text())),
    ))
}

/// Body is a JSON value of the given top-level type.
pub fn expect_body_type(body: &serde_json::Value, expected: JsonType) -> Result<(), Failure> {
    if expected.matches(body) {
        return Ok(());
    }
    Err(Failure::new(
        FailureKind::BodyType,
        format!("response body is a {}, not a {}", JsonType::of(body), expected.as_str()),
    )
    .with_expected(expected.as_str())
    .with_actual(JsonType::of(body)))
}

/// Body conforms to the registered schema for `kind`.
pub fn validate_schema(body: &serde_json::Value, kind: SchemaKind) -> Result<(), Failure> {
    let validator = jsonschema::validator_for(kind.document()).map_err(|e| {
        Failure::new(
            FailureKind::SchemaViolation,
            format!("{kind} schema cannot be compiled: {e}"),
        )
    })?;

    let errors: Vec<String> = validator
        .iter_errors(body)
        .take(MAX_SCHEMA_ERRORS)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        return Ok(());
    }
    Err(Failure::new(
        FailureKind::SchemaViolation,
        format!("response body does not match {kind} schema: {}", errors.join("; ")),
    ))
}

/// Field at JSON pointer `pointer` in `actual` equals `expected`.
pub fn expect_field(
    actual: &serde_json::Value,
    pointer: &str,
    expected: &serde_json::Value,
) -> Result<(), Failure> {
    match actual.pointer(pointer) {
        Some(value) if value == expected => Ok(()),
        found => Err(Failure::new(
            FailureKind::ValueMismatch,
            format!("{} does not match the expected value", field_name(pointer)),
        )
        .with_expected(expected.to_string())
        .with_actual(found.map_or_else(|| "<missing>".to_string(), ToString::to_string))),
    }
}

/// Every field named by `pointers` in `actual` equals the same field in `expected`.
///
/// Returns one failure per mismatching field.
pub fn compare_fields(
    expected: &serde_json::Value,
    actual: &serde_json::Value,
    pointers: &[&str],
) -> Vec<Failure> {
    pointers
        .iter()
        .filter_map(|p| {
            let want = expected.pointer(p).cloned().unwrap_or(serde_json::Value::Null);
            expect_field(actual, p, &want).err()
        })
        .collect()
}

/// Object `body` has `key`, and its value is an integer ≥ 0.
pub fn expect_non_negative_int(body: &serde_json::Value, key: &str) -> Result<(), Failure> {
    let Some(value) = body.get(key) else {
        return Err(Failure::new(
            FailureKind::BodyType,
            format!("response body has no \"{key}\" key"),
        )
        .with_expected(format!("\"{key}\" present"))
        .with_actual("<missing>"));
    };

    match value.as_i64() {
        Some(n) if n >= 0 => Ok(()),
        Some(n) => Err(Failure::new(
            FailureKind::ValueMismatch,
            format!("\"{key}\" is negative"),
        )
        .with_expected(">= 0")
        .with_actual(n.to_string())),
        None => Err(Failure::new(
            FailureKind::BodyType,
            format!("\"{key}\" is not an integer"),
        )
        .with_expected("integer")
        .with_actual(value.to_string())),
    }
}

/// `/category/name` → `category.name`
fn field_name(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use petcheck_core::{RequestSnapshot, Severity};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    fn resp(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            request: RequestSnapshot {
                method: "GET".into(),
                url: "http://localhost:8080/api/v3/pet/9999".into(),
                headers: HashMap::new(),
                body: None,
            },
            status,
            content_type: Some("text/plain".into()),
            body: body.to_string(),
            elapsed: Duration::from_millis(5),
        }
    }

    // ── status / text ──

    #[test]
    fn status_match_ok() {
        assert!(expect_status(&resp(404, "Pet not found"), 404).is_ok());
    }

    #[test]
    fn status_mismatch_carries_exchange() {
        let f = expect_status(&resp(200, "{}"), 404).unwrap_err();
        assert_eq!(f.kind, FailureKind::StatusMismatch);
        assert_eq!(f.expected.as_deref(), Some("404"));
        assert_eq!(f.actual.as_deref(), Some("200"));
        assert_eq!(f.response.unwrap().status_code, 200);
        assert!(f.request.is_some());
    }

    #[test]
    fn unexpected_server_error_is_critical() {
        let f = expect_status(&resp(500, "boom"), 200).unwrap_err();
        assert_eq!(f.severity, Severity::Critical);
    }

    #[test]
    fn text_exact_match() {
        assert!(expect_text(&resp(200, "Pet deleted"), "Pet deleted").is_ok());
        let f = expect_text(&resp(200, "Pet deleted\n"), "Pet deleted").unwrap_err();
        assert_eq!(f.kind, FailureKind::TextMismatch);
        assert_eq!(f.actual.as_deref(), Some("\"Pet deleted\\n\""));
    }

    // ── body type ──

    #[test]
    fn body_type_list_and_object() {
        assert!(expect_body_type(&json!([]), JsonType::List).is_ok());
        assert!(expect_body_type(&json!({"code": 400}), JsonType::Object).is_ok());

        let f = expect_body_type(&json!({"code": 400}), JsonType::List).unwrap_err();
        assert_eq!(f.kind, FailureKind::BodyType);
        assert_eq!(f.message, "response body is a object, not a list");
    }

    #[test]
    fn body_type_string_is_neither() {
        assert!(expect_body_type(&json!("oops"), JsonType::Object).is_err());
        assert!(expect_body_type(&json!("oops"), JsonType::List).is_err());
    }

    // ── schema ──

    #[test]
    fn schema_valid_pet() {
        let body = json!({"id": 1, "name": "Buddy", "photoUrls": [], "tags": [], "status": "available"});
        assert!(validate_schema(&body, SchemaKind::Pet).is_ok());
    }

    #[test]
    fn schema_violation_is_its_own_kind() {
        let body = json!({"id": "1", "name": "Buddy", "status": "available"});
        let f = validate_schema(&body, SchemaKind::Pet).unwrap_err();
        assert_eq!(f.kind, FailureKind::SchemaViolation);
        assert_eq!(f.severity, Severity::Warning);
        assert!(f.message.contains("is not of type"), "message: {}", f.message);
    }

    // ── fields ──

    #[test]
    fn compare_fields_all_match() {
        let payload = json!({"id": 10, "name": "doggie", "category": {"id": 1, "name": "Dogs"}});
        let body = json!({"id": 10, "name": "doggie", "category": {"id": 1, "name": "Dogs"}, "tags": []});
        assert!(compare_fields(&payload, &body, &["/id", "/name", "/category/id", "/category/name"]).is_empty());
    }

    #[test]
    fn compare_fields_reports_each_mismatch() {
        let payload = json!({"id": 10, "name": "doggie", "category": {"id": 1, "name": "Dogs"}});
        let body = json!({"id": 10, "name": "kitty", "category": {"id": 1}});
        let failures = compare_fields(&payload, &body, &["/id", "/name", "/category/name"]);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].message, "name does not match the expected value");
        assert_eq!(failures[0].actual.as_deref(), Some("\"kitty\""));
        assert_eq!(failures[1].message, "category.name does not match the expected value");
        assert_eq!(failures[1].actual.as_deref(), Some("<missing>"));
        assert!(failures.iter().all(|f| f.kind == FailureKind::ValueMismatch));
    }

    #[test]
    fn compare_arrays_exactly() {
        let payload = json!({"photoUrls": ["string"], "tags": [{"id": 0, "name": "string"}]});
        let body = json!({"photoUrls": ["string"], "tags": [{"id": 0, "name": "other"}]});
        let failures = compare_fields(&payload, &body, &["/photoUrls", "/tags"]);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.starts_with("tags"));
    }

    // ── inventory counts ──

    #[test]
    fn non_negative_int_checks() {
        let body = json!({"approved": 57, "delivered": 0, "sold": -1, "weird": "3", "ratio": 1.5});
        assert!(expect_non_negative_int(&body, "approved").is_ok());
        assert!(expect_non_negative_int(&body, "delivered").is_ok());

        let f = expect_non_negative_int(&body, "sold").unwrap_err();
        assert_eq!(f.kind, FailureKind::ValueMismatch);

        let f = expect_non_negative_int(&body, "weird").unwrap_err();
        assert_eq!(f.kind, FailureKind::BodyType);

        assert!(expect_non_negative_int(&body, "ratio").is_err());

        let f = expect_non_negative_int(&body, "placed").unwrap_err();
        assert_eq!(f.actual.as_deref(), Some("<missing>"));
    }
}
