//! HTTP file generator - renders failing requests in .http format

use crate::verdict::{Failure, RequestSnapshot};

/// Generate .http file content from failures.
///
/// Failures without a captured request (e.g. pure value checks on an
/// already-parsed body) are skipped.
pub fn to_http_file(failures: &[Failure]) -> String {
    let with_request: Vec<(&Failure, &RequestSnapshot)> = failures
        .iter()
        .filter_map(|f| f.request.as_ref().map(|r| (f, r)))
        .collect();

    let mut lines = Vec::new();
    lines.push(format!(
        "# Reproduction requests ({} failures)",
        with_request.len()
    ));
    lines.push(String::new());

    for (idx, (failure, request)) in with_request.iter().enumerate() {
        lines.push(format!(
            "### [{idx}] {} {} - {}",
            failure.severity, failure.case, failure.kind
        ));
        lines.push(format!("# Step: {}", failure.step));
        lines.push(format!("# {failure}"));
        lines.push(request_to_http(request));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render a single request as .http format
pub fn request_to_http(request: &RequestSnapshot) -> String {
    let mut lines = vec![format!("{} {}", request.method, request.url)];

    let mut headers: Vec<(&String, &String)> = request.headers.iter().collect();
    headers.sort();
    for (key, value) in headers {
        if !matches!(key.to_lowercase().as_str(), "host" | "content-length") {
            lines.push(format!("{key}: {value}"));
        }
    }

    if let Some(body) = &request.body {
        if !request
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"))
        {
            lines.push("Content-Type: application/json".to_string());
        }
        lines.push(String::new());
        lines.push(body.clone());
    }

    lines.join("\n")
}
