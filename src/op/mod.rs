//! Bulk generative-operation pipeline.
//!
//! Chunker → dispatcher → decoder → merge engine, sequenced per operation by
//! the orchestrator.
pub mod chunk;
pub mod contract;
pub mod decode;
pub mod dispatch;
pub mod merge;
pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{
    CancelToken, OperationKind, OperationReport, OperationRequest, Orchestrator,
};
