//! Service invocation logging for operation transparency.
//!
//! Entries are appended to `oplog.jsonl` in the project directory as
//! newline-delimited JSON, one per dispatched chunk, so a user can see what
//! each operation asked for and why it succeeded or failed. A log write
//! failure is reported on the trace log and never fails the operation.
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current schema version for oplog.jsonl entries.
pub const OPLOG_SCHEMA_VERSION: u32 = 1;

/// Outcome of one service invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    Ok,
    TransportError,
    DecodeError,
}

/// One dispatched chunk, as logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpLogEntry {
    pub schema_version: u32,
    /// Unix timestamp (seconds) of the dispatch.
    pub ts: u64,
    /// Operation kind label (repair, generate, evolve, edit, phonology).
    pub operation: String,
    pub chunk_index: usize,
    pub duration_ms: u64,
    pub prompt_bytes: usize,
    pub response_bytes: usize,
    pub outcome: InvocationOutcome,
}

impl OpLogEntry {
    pub fn new(
        operation: &str,
        chunk_index: usize,
        duration_ms: u64,
        prompt_bytes: usize,
        response_bytes: usize,
        outcome: InvocationOutcome,
    ) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            schema_version: OPLOG_SCHEMA_VERSION,
            ts,
            operation: operation.to_string(),
            chunk_index,
            duration_ms,
            prompt_bytes,
            response_bytes,
            outcome,
        }
    }
}

/// Append-only JSONL log of service invocations.
#[derive(Debug, Clone)]
pub struct OpLog {
    path: PathBuf,
}

impl OpLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one entry; failures are logged and swallowed.
    pub fn append(&self, entry: &OpLogEntry) {
        if let Err(e) = self.try_append(entry) {
            tracing::warn!(path = %self.path.display(), "oplog append failed: {e}");
        }
    }

    fn try_append(&self, entry: &OpLogEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}
