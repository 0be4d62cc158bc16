//! Per-chunk request dispatch against the generative service.
//!
//! One outbound call per invocation, no retries: retry/backoff policy, if
//! any, belongs to the transport. Transport errors, non-success responses,
//! and decode failures are all reported as a `ChunkFailure` carrying the
//! chunk's positional index; the cause and raw text go to the log, not to the
//! caller.
use crate::op::contract::ResponseContract;
use crate::op::decode;
use crate::transport::{GenerativeService, ServiceRequest};
use serde_json::Value;
use std::time::{Duration, Instant};

/// How a chunk failed. Internal only: the orchestrator uses it to decide
/// whether the service was reachable at all; callers see a uniform failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Decode,
}

/// A failed chunk, positioned so the caller can report which chunk failed
/// without losing the others' successes.
#[derive(Debug)]
pub struct ChunkFailure {
    pub chunk_index: usize,
    pub kind: FailureKind,
    pub message: String,
    pub duration: Duration,
}

/// A successfully dispatched and decoded chunk.
#[derive(Debug)]
pub struct Dispatched {
    pub value: Value,
    pub response_bytes: usize,
    pub duration: Duration,
}

/// Issue one call for one chunk and decode the response against the contract.
pub fn dispatch_chunk(
    service: &dyn GenerativeService,
    prompt: &str,
    contract: &ResponseContract,
    chunk_index: usize,
) -> Result<Dispatched, ChunkFailure> {
    let start = Instant::now();
    let request = ServiceRequest {
        prompt: prompt.to_string(),
        schema_hint: Some(contract.schema_hint()),
        model: None,
    };

    let raw = match service.generate(&request) {
        Ok(raw) => raw,
        Err(e) => {
            let duration = start.elapsed();
            tracing::warn!(
                chunk_index,
                contract = contract.name,
                error = %e,
                "chunk dispatch failed at transport"
            );
            return Err(ChunkFailure {
                chunk_index,
                kind: FailureKind::Transport,
                message: format!("service call failed: {e}"),
                duration,
            });
        }
    };

    let duration = start.elapsed();
    match decode::decode(&raw, contract) {
        Ok(value) => {
            tracing::info!(
                chunk_index,
                contract = contract.name,
                elapsed_ms = duration.as_millis() as u64,
                prompt_bytes = prompt.len(),
                response_bytes = raw.len(),
                "chunk dispatch complete"
            );
            Ok(Dispatched {
                value,
                response_bytes: raw.len(),
                duration,
            })
        }
        Err(e) => {
            tracing::warn!(
                chunk_index,
                contract = contract.name,
                raw = %e.raw,
                "chunk response failed to decode: {}",
                e.message
            );
            Err(ChunkFailure {
                chunk_index,
                kind: FailureKind::Decode,
                message: format!("decode failed: {}", e.message),
                duration,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::contract::REPAIR;
    use crate::transport::TransportError;

    struct Canned(&'static str);

    impl GenerativeService for Canned {
        fn generate(&self, _request: &ServiceRequest) -> Result<String, TransportError> {
            Ok(self.0.to_string())
        }
    }

    struct Down;

    impl GenerativeService for Down {
        fn generate(&self, _request: &ServiceRequest) -> Result<String, TransportError> {
            Err(TransportError::new("connection refused"))
        }
    }

    #[test]
    fn valid_response_dispatches() {
        let service = Canned(r#"[{"id": "a1", "word": "kava", "ipa": "ka"}]"#);
        let dispatched = dispatch_chunk(&service, "fix these", &REPAIR, 0).unwrap();
        assert_eq!(dispatched.value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn transport_error_carries_chunk_index_and_kind() {
        let failure = dispatch_chunk(&Down, "fix these", &REPAIR, 3).unwrap_err();
        assert_eq!(failure.chunk_index, 3);
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(failure.message.contains("connection refused"));
    }

    #[test]
    fn malformed_response_is_a_decode_failure() {
        let service = Canned("sorry, I cannot help with that");
        let failure = dispatch_chunk(&service, "fix these", &REPAIR, 1).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Decode);
        assert_eq!(failure.chunk_index, 1);
    }

    #[test]
    fn schema_hint_accompanies_every_request() {
        struct CaptureHint;
        impl GenerativeService for CaptureHint {
            fn generate(&self, request: &ServiceRequest) -> Result<String, TransportError> {
                assert!(request.schema_hint.is_some());
                Ok("[]".to_string())
            }
        }
        dispatch_chunk(&CaptureHint, "p", &REPAIR, 0).unwrap();
    }
}
