//! # cortex-core
//!
//! Foundation crate for the Cortex memory pipeline.
//! Defines the scoped domain model (`Scope`, `Memory`, `MemoryRevision`, `Job`),
//! the in-flight pipeline types (`ConversationEvent`, `ExtractionCandidate`,
//! `MergeCandidate`), the adapter/gateway traits every other crate implements
//! or consumes, and the shared error and config types.
//!
//! Every other crate in the workspace depends on this one.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod job;
pub mod memory;
pub mod scope;
pub mod traits;

pub use config::CortexConfig;
pub use errors::{CortexError, CortexResult};
pub use events::ConversationEvent;
pub use job::{Job, JobKind, JobStatus};
pub use memory::{
    Category, ExtractionCandidate, MergeCandidate, Memory, MemoryRevision, RevisionAction,
    SourceType,
};
pub use scope::Scope;
pub use traits::{
    EmbedResult, EmbeddingProvider, LlmProvider, LlmResponse, MemoryFilter, RelationalStore,
    SessionsClient, VectorPoint, VectorSearchFilter, VectorSearchHit, VectorStore,
};
