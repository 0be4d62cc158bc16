//! Sanitizing and decoding raw service text into contract-validated JSON.
//!
//! The service response is untrusted free-form text: it may arrive wrapped in
//! markdown code fences, with prose around the payload, or with the wrong
//! top-level container. Decoding is a fixed pipeline: strip fences, trim,
//! parse as JSON, then validate the parsed value against the operation's
//! contract. A failure always carries the raw offending text so the log can
//! show exactly what the service said; nothing is ever silently substituted
//! with a best guess.
use crate::op::contract::{ContractShape, FieldKind, FieldSpec, ResponseContract};
use serde_json::Value;
use std::fmt;

/// A decode failure with the raw response captured for diagnostics.
#[derive(Debug)]
pub struct DecodeError {
    pub message: String,
    pub raw: String,
}

impl DecodeError {
    fn new(message: impl Into<String>, raw: &str) -> Self {
        Self {
            message: message.into(),
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snippet: String = self.raw.chars().take(200).collect();
        write!(f, "{} (raw: {snippet})", self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Decode raw service text against a contract.
///
/// Returns the payload value: the item array for array-shaped contracts, the
/// object itself for `SingleObject`. Extra fields in items are ignored;
/// missing required fields or wrong kinds fail the whole chunk.
pub fn decode(raw: &str, contract: &ResponseContract) -> Result<Value, DecodeError> {
    let payload = extract_payload(raw);
    if payload.is_empty() {
        return Err(DecodeError::new("empty response", raw));
    }

    let value: Value = serde_json::from_str(payload)
        .map_err(|e| DecodeError::new(format!("response is not valid JSON: {e}"), raw))?;

    let payload_value = match contract.shape {
        ContractShape::ItemArray => value,
        ContractShape::WrappedArray(container) => match value {
            // Recovery: the service returned the bare array where an object
            // wrapper was requested; treat it as the container's value.
            Value::Array(items) => Value::Array(items),
            Value::Object(mut map) => map.remove(container).ok_or_else(|| {
                DecodeError::new(format!("response object is missing `{container}`"), raw)
            })?,
            _ => {
                return Err(DecodeError::new(
                    format!("expected an object wrapping `{container}`"),
                    raw,
                ))
            }
        },
        ContractShape::SingleObject => value,
    };

    match contract.shape {
        ContractShape::SingleObject => {
            let mut errors = Vec::new();
            validate_object(&payload_value, contract.fields, "$", &mut errors);
            if errors.is_empty() {
                Ok(payload_value)
            } else {
                Err(DecodeError::new(errors.join("; "), raw))
            }
        }
        _ => {
            let items = payload_value.as_array().ok_or_else(|| {
                DecodeError::new(
                    format!("expected a JSON array for `{}`", contract.name),
                    raw,
                )
            })?;
            let mut errors = Vec::new();
            for (index, item) in items.iter().enumerate() {
                validate_object(item, contract.fields, &format!("$[{index}]"), &mut errors);
            }
            if errors.is_empty() {
                Ok(payload_value)
            } else {
                Err(DecodeError::new(errors.join("; "), raw))
            }
        }
    }
}

/// Extract the JSON payload from text that may carry markdown code fences.
///
/// Fence markers are matched case-insensitively; text outside the fenced
/// block is discarded. Without fences the trimmed text is the payload.
fn extract_payload(text: &str) -> &str {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();

    if let Some(start) = lower.find("```json") {
        let start = start + "```json".len();
        if let Some(end) = lower[start..].find("```") {
            return trimmed[start..start + end].trim();
        }
    }

    if let Some(start) = lower.find("```") {
        let start = start + 3;
        // Skip a language identifier line if present
        let start = trimmed[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = lower[start..].find("```") {
            return trimmed[start..start + end].trim();
        }
    }

    trimmed
}

fn validate_object(value: &Value, fields: &[FieldSpec], path: &str, errors: &mut Vec<String>) {
    let Some(map) = value.as_object() else {
        errors.push(format!("{path}: expected an object"));
        return;
    };

    for field in fields {
        match map.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    errors.push(format!("{path}.{}: missing required field", field.name));
                }
            }
            Some(found) => validate_kind(found, field, path, errors),
        }
    }
}

fn validate_kind(value: &Value, field: &FieldSpec, path: &str, errors: &mut Vec<String>) {
    let field_path = format!("{path}.{}", field.name);
    match field.kind {
        FieldKind::String => {
            if !value.is_string() {
                errors.push(format!("{field_path}: expected a string"));
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                errors.push(format!("{field_path}: expected a boolean"));
            }
        }
        FieldKind::Number => {
            if !value.is_number() {
                errors.push(format!("{field_path}: expected a number"));
            }
        }
        FieldKind::StringArray => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        errors.push(format!("{field_path}[{index}]: expected a string"));
                    }
                }
            }
            None => errors.push(format!("{field_path}: expected an array of strings")),
        },
        FieldKind::ObjectArray(nested) => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    validate_object(item, nested, &format!("{field_path}[{index}]"), errors);
                }
            }
            None => errors.push(format!("{field_path}: expected an array of objects")),
        },
    }
}
