//! Transport boundary to the external generative text service.
//!
//! The orchestrator only assumes "prompt in, text out, with an optional
//! structured-response hint". `GenerativeService` is injected so tests can
//! substitute canned responses without a live endpoint; `HttpService` is the
//! production implementation.
//!
//! Retry, backoff, and timeouts live here (or below, in the HTTP agent), not
//! in the dispatcher: a deadline expiring in flight surfaces as the same
//! `TransportError` as any other network failure.
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One request to the generative service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequest {
    /// Full instruction text for this chunk.
    pub prompt: String,

    /// Optional JSON-Schema-like hint describing the expected response shape.
    /// Servers may ignore it; the decoder never trusts it.
    #[serde(rename = "schema", skip_serializing_if = "Option::is_none")]
    pub schema_hint: Option<Value>,

    /// Optional model selector forwarded verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Transport-level failure: network error, non-success status, or an
/// unreadable response body. The dispatcher treats all of these uniformly.
#[derive(Debug)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// A generative text service: one request, one text payload or an error.
pub trait GenerativeService {
    fn generate(&self, request: &ServiceRequest) -> Result<String, TransportError>;
}

/// HTTP implementation posting JSON to a configured endpoint.
pub struct HttpService {
    endpoint: String,
    model: Option<String>,
}

impl HttpService {
    pub fn new(endpoint: String, model: Option<String>) -> Self {
        Self { endpoint, model }
    }
}

impl GenerativeService for HttpService {
    fn generate(&self, request: &ServiceRequest) -> Result<String, TransportError> {
        let payload = ServiceRequest {
            prompt: request.prompt.clone(),
            schema_hint: request.schema_hint.clone(),
            model: request.model.clone().or_else(|| self.model.clone()),
        };

        let mut response = ureq::post(&self.endpoint)
            .send_json(&payload)
            .map_err(|e| TransportError::new(format!("POST {}: {e}", self.endpoint)))?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(format!("read response body: {e}")))?;

        Ok(extract_text_payload(&body))
    }
}

/// Unwrap a `{"text": "..."}` envelope when present; otherwise the body is
/// the payload. Keeps the boundary vendor-neutral.
fn extract_text_payload(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(text)) = map.get("text") {
            return text.clone();
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_envelope_is_unwrapped() {
        let body = r#"{"text": "[{\"word\": \"kava\"}]"}"#;
        assert_eq!(extract_text_payload(body), r#"[{"word": "kava"}]"#);
    }

    #[test]
    fn bare_body_passes_through() {
        let body = r#"[{"word": "kava"}]"#;
        assert_eq!(extract_text_payload(body), body);
    }

    #[test]
    fn object_without_text_field_passes_through() {
        let body = r#"{"modifications": []}"#;
        assert_eq!(extract_text_payload(body), body);
    }
}
