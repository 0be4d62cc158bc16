//! Top-level controller for bulk generative operations.
//!
//! All five operation kinds are variants of the same sequential loop,
//! configured by a per-kind descriptor: chunk size, response contract, and
//! merge style. Chunks run strictly one at a time so chunk *i+1* observes
//! chunk *i*'s merge (identity lookups and the etymology trail depend on
//! this), and so at most one call is in flight per operation.
//!
//! Failure policy: a failed chunk contributes zero updates and the loop
//! continues; the report's success flag only goes false when the whole
//! operation produced zero usable results, or when the service could not be
//! reached on the very first chunk (fatal: the original collection is
//! returned unchanged). The caller always receives a definite collection and
//! a boolean plus optional message, never an exception.
use crate::constraints::ConstraintSet;
use crate::lexicon::{LexiconEntry, SoundChangeRule};
use crate::op::contract::{self, ResponseContract};
use crate::op::dispatch::{self, ChunkFailure, Dispatched, FailureKind};
use crate::op::{chunk, merge, prompt};
use crate::oplog::{InvocationOutcome, OpLog, OpLogEntry};
use crate::phonology::PhonologyConfig;
use crate::transport::GenerativeService;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Chunk size for repair batches.
pub const REPAIR_CHUNK_SIZE: usize = 15;
/// Chunk size for evolution batches.
pub const EVOLVE_CHUNK_SIZE: usize = 10;

/// The five bulk operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Repair,
    Generate,
    Evolve,
    Edit,
    Phonology,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Repair => "repair",
            OperationKind::Generate => "generate",
            OperationKind::Evolve => "evolve",
            OperationKind::Edit => "edit",
            OperationKind::Phonology => "phonology",
        }
    }
}

/// Caller-supplied parameters for one operation invocation.
#[derive(Debug)]
pub enum OperationRequest<'a> {
    /// Repair the given constraint-violating entries (a subset of the
    /// collection, selected by the caller).
    Repair {
        invalid: &'a [LexiconEntry],
        constraints: &'a ConstraintSet,
    },
    /// Generate brand-new entries.
    Generate {
        count: usize,
        vibe: &'a str,
        constraints: &'a ConstraintSet,
    },
    /// Apply ordered sound changes to the whole collection.
    Evolve { rules: &'a [SoundChangeRule] },
    /// Instruction-driven bulk edit over the whole collection.
    Edit {
        instruction: &'a str,
        constraints: &'a ConstraintSet,
    },
    /// Generate a full phonology from a description.
    Phonology { description: &'a str },
}

impl OperationRequest<'_> {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::Repair { .. } => OperationKind::Repair,
            OperationRequest::Generate { .. } => OperationKind::Generate,
            OperationRequest::Evolve { .. } => OperationKind::Evolve,
            OperationRequest::Edit { .. } => OperationKind::Edit,
            OperationRequest::Phonology { .. } => OperationKind::Phonology,
        }
    }
}

/// Final report of one operation invocation.
#[derive(Debug, Serialize)]
pub struct OperationReport {
    pub operation: OperationKind,
    pub success: bool,
    pub modified_count: usize,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Updated collection for mutating/generating operations; the original
    /// collection on a fatal failure. Not part of the JSON summary.
    #[serde(skip)]
    pub lexicon: Option<Vec<LexiconEntry>>,

    /// Decoded inventory for the phonology operation.
    #[serde(skip)]
    pub phonology: Option<PhonologyConfig>,
}

/// Cooperative cancellation shared between the caller and a running
/// operation; checked before each dispatch, never mid-chunk.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs operations against an injected service.
pub struct Orchestrator<'a> {
    service: &'a dyn GenerativeService,
    oplog: Option<OpLog>,
    cancel: CancelToken,
}

impl<'a> Orchestrator<'a> {
    pub fn new(service: &'a dyn GenerativeService) -> Self {
        Self {
            service,
            oplog: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_oplog(mut self, oplog: OpLog) -> Self {
        self.oplog = Some(oplog);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run one operation against a snapshot of the collection.
    ///
    /// The input slice is never mutated; the report carries the result
    /// collection so the caller can swap it in atomically.
    pub fn run(&self, lexicon: &[LexiconEntry], request: &OperationRequest) -> OperationReport {
        let kind = request.kind();
        tracing::info!(operation = kind.as_str(), entries = lexicon.len(), "operation start");

        let report = match request {
            OperationRequest::Repair {
                invalid,
                constraints,
            } => self.run_entry_batches(
                kind,
                lexicon,
                invalid,
                REPAIR_CHUNK_SIZE,
                &contract::REPAIR,
                false,
                |part| prompt::repair_prompt(part, constraints),
            ),
            OperationRequest::Evolve { rules } => {
                if rules.is_empty() {
                    Self::trivial(kind, lexicon)
                } else {
                    self.run_entry_batches(
                        kind,
                        lexicon,
                        lexicon,
                        EVOLVE_CHUNK_SIZE,
                        &contract::EVOLVE,
                        true,
                        |part| prompt::evolve_prompt(part, rules),
                    )
                }
            }
            OperationRequest::Edit {
                instruction,
                constraints,
            } => self.run_entry_batches(
                kind,
                lexicon,
                lexicon,
                lexicon.len().max(1),
                &contract::EDIT,
                false,
                |part| prompt::edit_prompt(part, instruction, constraints),
            ),
            OperationRequest::Generate {
                count,
                vibe,
                constraints,
            } => self.run_generate(kind, lexicon, *count, vibe, constraints),
            OperationRequest::Phonology { description } => self.run_phonology(kind, description),
        };

        tracing::info!(
            operation = kind.as_str(),
            success = report.success,
            modified = report.modified_count,
            chunks_failed = report.chunks_failed,
            "operation done"
        );
        report
    }

    /// Shared loop for operations that chunk existing entries and merge
    /// per-entity updates back by identity.
    #[allow(clippy::too_many_arguments)]
    fn run_entry_batches(
        &self,
        kind: OperationKind,
        lexicon: &[LexiconEntry],
        items: &[LexiconEntry],
        chunk_size: usize,
        contract: &ResponseContract,
        append_etymology: bool,
        build_prompt: impl Fn(&[LexiconEntry]) -> String,
    ) -> OperationReport {
        if items.is_empty() {
            return Self::trivial(kind, lexicon);
        }

        let parts = chunk::chunks(items, chunk_size);
        let chunks_total = parts.len();
        let mut working = lexicon.to_vec();
        let mut modified = 0usize;
        let mut successes = 0usize;
        let mut failures: Vec<ChunkFailure> = Vec::new();
        let mut cancelled = false;

        for (index, part) in parts.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let prompt_text = build_prompt(part);
            let outcome =
                dispatch::dispatch_chunk(self.service, &prompt_text, contract, index);
            self.log_dispatch(kind, index, prompt_text.len(), &outcome);

            match outcome {
                Ok(dispatched) => {
                    match serde_json::from_value::<Vec<merge::EntryUpdate>>(dispatched.value) {
                        Ok(updates) => {
                            modified += merge::apply_updates(
                                &mut working,
                                &updates,
                                append_etymology,
                            );
                            successes += 1;
                        }
                        Err(e) => {
                            // Contract validation already passed, so this only
                            // fires on kinds the typed update cannot carry;
                            // treat it as the chunk contributing nothing.
                            tracing::warn!(chunk_index = index, "update conversion failed: {e}");
                            failures.push(ChunkFailure {
                                chunk_index: index,
                                kind: FailureKind::Decode,
                                message: format!("update conversion failed: {e}"),
                                duration: dispatched.duration,
                            });
                        }
                    }
                }
                Err(failure) => {
                    if index == 0 && failure.kind == FailureKind::Transport {
                        // Service unreachable before any chunk landed: abort
                        // with the original collection untouched.
                        return OperationReport {
                            operation: kind,
                            success: false,
                            modified_count: 0,
                            chunks_total,
                            chunks_failed: 1,
                            message: Some(format!(
                                "service unreachable: {}",
                                failure.message
                            )),
                            lexicon: Some(lexicon.to_vec()),
                            phonology: None,
                        };
                    }
                    failures.push(failure);
                }
            }
        }

        let success = successes > 0;
        OperationReport {
            operation: kind,
            success,
            modified_count: modified,
            chunks_total,
            chunks_failed: failures.len(),
            message: Self::loop_message(&failures, cancelled, chunks_total, successes),
            lexicon: Some(working),
            phonology: None,
        }
    }

    fn run_generate(
        &self,
        kind: OperationKind,
        lexicon: &[LexiconEntry],
        count: usize,
        vibe: &str,
        constraints: &ConstraintSet,
    ) -> OperationReport {
        if count == 0 {
            return Self::trivial(kind, lexicon);
        }
        if self.cancel.is_cancelled() {
            let mut report = Self::trivial(kind, lexicon);
            report.success = false;
            report.message = Some("operation cancelled before dispatch".to_string());
            return report;
        }

        let prompt_text = prompt::generate_prompt(count, vibe, constraints);
        let outcome = dispatch::dispatch_chunk(self.service, &prompt_text, &contract::GENERATE, 0);
        self.log_dispatch(kind, 0, prompt_text.len(), &outcome);

        match outcome {
            Ok(dispatched) => {
                let new_entries: Vec<merge::NewEntry> =
                    match serde_json::from_value(dispatched.value) {
                        Ok(entries) => entries,
                        Err(e) => {
                            return Self::single_chunk_failure(
                                kind,
                                lexicon,
                                &format!("update conversion failed: {e}"),
                            )
                        }
                    };
                let mut working = lexicon.to_vec();
                let appended = merge::append_new(&mut working, &new_entries);
                OperationReport {
                    operation: kind,
                    success: true,
                    modified_count: appended,
                    chunks_total: 1,
                    chunks_failed: 0,
                    message: None,
                    lexicon: Some(working),
                    phonology: None,
                }
            }
            Err(failure) => Self::single_chunk_failure(kind, lexicon, &failure.message),
        }
    }

    fn run_phonology(&self, kind: OperationKind, description: &str) -> OperationReport {
        if self.cancel.is_cancelled() {
            return OperationReport {
                operation: kind,
                success: false,
                modified_count: 0,
                chunks_total: 1,
                chunks_failed: 0,
                message: Some("operation cancelled before dispatch".to_string()),
                lexicon: None,
                phonology: None,
            };
        }

        let prompt_text = prompt::phonology_prompt(description);
        let outcome =
            dispatch::dispatch_chunk(self.service, &prompt_text, &contract::PHONOLOGY, 0);
        self.log_dispatch(kind, 0, prompt_text.len(), &outcome);

        match outcome {
            Ok(dispatched) => match serde_json::from_value::<PhonologyConfig>(dispatched.value) {
                Ok(phonology) => OperationReport {
                    operation: kind,
                    success: true,
                    modified_count: 0,
                    chunks_total: 1,
                    chunks_failed: 0,
                    message: None,
                    lexicon: None,
                    phonology: Some(phonology),
                },
                Err(e) => OperationReport {
                    operation: kind,
                    success: false,
                    modified_count: 0,
                    chunks_total: 1,
                    chunks_failed: 1,
                    message: Some(format!("phonology conversion failed: {e}")),
                    lexicon: None,
                    phonology: None,
                },
            },
            Err(failure) => OperationReport {
                operation: kind,
                success: false,
                modified_count: 0,
                chunks_total: 1,
                chunks_failed: 1,
                message: Some(failure.message),
                lexicon: None,
                phonology: None,
            },
        }
    }

    /// Empty input short-circuits to a trivial success without any dispatch.
    fn trivial(kind: OperationKind, lexicon: &[LexiconEntry]) -> OperationReport {
        OperationReport {
            operation: kind,
            success: true,
            modified_count: 0,
            chunks_total: 0,
            chunks_failed: 0,
            message: None,
            lexicon: Some(lexicon.to_vec()),
            phonology: None,
        }
    }

    fn single_chunk_failure(
        kind: OperationKind,
        lexicon: &[LexiconEntry],
        message: &str,
    ) -> OperationReport {
        OperationReport {
            operation: kind,
            success: false,
            modified_count: 0,
            chunks_total: 1,
            chunks_failed: 1,
            message: Some(message.to_string()),
            lexicon: Some(lexicon.to_vec()),
            phonology: None,
        }
    }

    fn loop_message(
        failures: &[ChunkFailure],
        cancelled: bool,
        chunks_total: usize,
        successes: usize,
    ) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(first) = failures.first() {
            parts.push(format!(
                "{} of {} chunks failed; first failure (chunk {}): {}",
                failures.len(),
                chunks_total,
                first.chunk_index,
                first.message
            ));
        }
        if cancelled {
            parts.push(format!(
                "cancelled after {} of {} chunks",
                successes + failures.len(),
                chunks_total
            ));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }

    fn log_dispatch(
        &self,
        kind: OperationKind,
        chunk_index: usize,
        prompt_bytes: usize,
        outcome: &Result<Dispatched, ChunkFailure>,
    ) {
        let Some(oplog) = &self.oplog else {
            return;
        };
        let entry = match outcome {
            Ok(dispatched) => OpLogEntry::new(
                kind.as_str(),
                chunk_index,
                dispatched.duration.as_millis() as u64,
                prompt_bytes,
                dispatched.response_bytes,
                InvocationOutcome::Ok,
            ),
            Err(failure) => OpLogEntry::new(
                kind.as_str(),
                chunk_index,
                failure.duration.as_millis() as u64,
                prompt_bytes,
                0,
                match failure.kind {
                    FailureKind::Transport => InvocationOutcome::TransportError,
                    FailureKind::Decode => InvocationOutcome::DecodeError,
                },
            ),
        };
        oplog.append(&entry);
    }
}
