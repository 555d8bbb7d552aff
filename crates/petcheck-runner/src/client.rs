//! Blocking HTTP client for the Pet Store endpoints
//!
//! One request in flight at a time, single attempt, no retries. Every call
//! returns the full exchange so checks can attach it to failures.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use petcheck_core::{Config, Failure, FailureKind, Order, Pet, RequestSnapshot, ResponseSnapshot};

/// Response bodies longer than this are truncated in snapshots.
const MAX_SNAPSHOT_BYTES: usize = 4096;

/// Client bound to one Pet Store base URL.
pub struct PetStoreClient {
    http: reqwest::blocking::Client,
    base_url: String,
    headers: HashMap<String, String>,
}

impl PetStoreClient {
    /// Build a client for the server named by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            headers: config.headers.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST /pet`
    pub fn add_pet(&self, pet: &Pet) -> Result<ApiResponse, ClientError> {
        self.send(Method::POST, "/pet", &[], Some(pet))
    }

    /// `PUT /pet`
    pub fn update_pet(&self, pet: &Pet) -> Result<ApiResponse, ClientError> {
        self.send(Method::PUT, "/pet", &[], Some(pet))
    }

    /// `GET /pet/{id}`
    pub fn get_pet(&self, id: i64) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::GET, &format!("/pet/{id}"), &[], None)
    }

    /// `DELETE /pet/{id}`
    pub fn delete_pet(&self, id: i64) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::DELETE, &format!("/pet/{id}"), &[], None)
    }

    /// `GET /pet/findByStatus?status=` (status is sent verbatim, even empty)
    pub fn find_pets_by_status(&self, status: &str) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::GET, "/pet/findByStatus", &[("status", status)], None)
    }

    /// `POST /store/order`
    pub fn place_order(&self, order: &Order) -> Result<ApiResponse, ClientError> {
        self.send(Method::POST, "/store/order", &[], Some(order))
    }

    /// `GET /store/order/{id}`
    pub fn get_order(&self, id: i64) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::GET, &format!("/store/order/{id}"), &[], None)
    }

    /// `DELETE /store/order/{id}`
    pub fn delete_order(&self, id: i64) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::DELETE, &format!("/store/order/{id}"), &[], None)
    }

    /// `GET /store/inventory`
    pub fn get_inventory(&self) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::GET, "/store/inventory", &[], None)
    }

    fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<ApiResponse, ClientError> {
        let body_text = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ClientError::Encode(e.to_string()))?;

        let mut req = self.http.request(method.clone(), self.endpoint(path));
        for (k, v) in &self.headers {
            req = req.header(k, v);
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(text) = &body_text {
            req = req.header(CONTENT_TYPE, "application/json").body(text.clone());
        }
        let request = req.build().map_err(|e| ClientError::Build(e.to_string()))?;

        let snapshot = RequestSnapshot {
            method: method.to_string(),
            url: request.url().to_string(),
            headers: self.headers.clone(),
            body: body_text,
        };

        let start = Instant::now();
        let resp = self
            .http
            .execute(request)
            .map_err(|e| ClientError::transport(&snapshot, &e))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp
            .text()
            .map_err(|e| ClientError::transport(&snapshot, &e))?;
        let elapsed = start.elapsed();

        debug!(
            method = %snapshot.method,
            url = %snapshot.url,
            status,
            elapsed_ms = millis(elapsed),
            "exchange"
        );

        Ok(ApiResponse {
            request: snapshot,
            status,
            content_type,
            body: text,
            elapsed,
        })
    }
}

/// A completed request/response exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub request: RequestSnapshot,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub elapsed: Duration,
}

impl ApiResponse {
    /// Response body as plain text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `MalformedJson` if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::MalformedJson {
            request: Box::new(self.request.clone()),
            response: Box::new(self.response_snapshot()),
            message: e.to_string(),
        })
    }

    #[must_use]
    pub fn response_snapshot(&self) -> ResponseSnapshot {
        ResponseSnapshot {
            status_code: self.status,
            content_type: self.content_type.clone(),
            body: (!self.body.is_empty()).then(|| truncate(&self.body)),
            latency_ms: millis(self.elapsed),
        }
    }

    /// Attach this exchange to a failure
    #[must_use]
    pub fn attach(&self, failure: Failure) -> Failure {
        failure.with_exchange(self.request.clone(), self.response_snapshot())
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Safe UTF-8 truncation: walk back to char boundary
fn truncate(body: &str) -> String {
    if body.len() <= MAX_SNAPSHOT_BYTES {
        return body.to_string();
    }
    let mut end = MAX_SNAPSHOT_BYTES;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…({} bytes total)", &body[..end], body.len())
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Build(String),
    #[error("Cannot encode request body: {0}")]
    Encode(String),
    #[error("{} {}: {message}", .request.method, .request.url)]
    Transport {
        request: Box<RequestSnapshot>,
        message: String,
    },
    #[error("{} {} returned malformed JSON: {message}", .request.method, .request.url)]
    MalformedJson {
        request: Box<RequestSnapshot>,
        response: Box<ResponseSnapshot>,
        message: String,
    },
}

impl ClientError {
    fn transport(request: &RequestSnapshot, err: &reqwest::Error) -> Self {
        Self::Transport {
            request: Box::new(request.clone()),
            message: err.to_string(),
        }
    }

    /// Report form of this error.
    #[must_use]
    pub fn to_failure(&self) -> Failure {
        match self {
            Self::Build(_) | Self::Encode(_) => {
                Failure::new(FailureKind::Transport, self.to_string())
            }
            Self::Transport { request, .. } => Failure::new(FailureKind::Transport, self.to_string())
                .with_request(request.as_ref().clone()),
            Self::MalformedJson {
                request, response, ..
            } => Failure::new(FailureKind::MalformedJson, self.to_string())
                .with_exchange(request.as_ref().clone(), response.as_ref().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PetStoreClient {
        PetStoreClient::from_config(&Config::default()).unwrap()
    }

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            request: RequestSnapshot {
                method: "GET".into(),
                url: "http://localhost:8080/api/v3/store/inventory".into(),
                headers: HashMap::new(),
                body: None,
            },
            status,
            content_type: Some("application/json".into()),
            body: body.to_string(),
            elapsed: Duration::from_millis(15),
        }
    }

    #[test]
    fn endpoint_appends_to_base_url() {
        let c = client();
        assert_eq!(c.base_url(), "http://localhost:8080/api/v3");
        assert_eq!(c.endpoint("/pet/42"), "http://localhost:8080/api/v3/pet/42");
    }

    #[test]
    fn json_parses_body() {
        let v = response(200, r#"{"approved": 3}"#).json().unwrap();
        assert_eq!(v["approved"], 3);
    }

    #[test]
    fn json_malformed_body_is_error_with_exchange() {
        let err = response(200, "Pet deleted").json().unwrap_err();
        assert!(matches!(err, ClientError::MalformedJson { .. }));
        let failure = err.to_failure();
        assert_eq!(failure.kind, FailureKind::MalformedJson);
        assert_eq!(failure.response.unwrap().body.as_deref(), Some("Pet deleted"));
    }

    #[test]
    fn snapshot_omits_empty_body() {
        let snap = response(200, "").response_snapshot();
        assert!(snap.body.is_none());
        assert_eq!(snap.latency_ms, 15);
    }

    #[test]
    fn millis_saturates_instead_of_wrapping() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "я".repeat(MAX_SNAPSHOT_BYTES);
        let out = truncate(&body);
        assert!(out.ends_with(&format!("({} bytes total)", body.len())));
        assert!(out.len() < body.len());
    }

    #[test]
    fn transport_failure_is_critical() {
        let err = ClientError::Transport {
            request: Box::new(response(0, "").request),
            message: "connection refused".into(),
        };
        let failure = err.to_failure();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.severity, petcheck_core::Severity::Critical);
        assert!(failure.message.contains("connection refused"));
        assert!(failure.request.is_some());
    }
}
