mod consolidation_error;
mod coordinator_error;
mod embedding_error;
mod llm_error;
mod queue_error;
mod retrieval_error;
mod storage_error;
mod vector_error;

pub use consolidation_error::ConsolidationError;
pub use coordinator_error::CoordinatorError;
pub use embedding_error::EmbeddingError;
pub use llm_error::LlmError;
pub use queue_error::QueueError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
pub use vector_error::VectorError;

/// Top-level error type every crate in the workspace converts into at its
/// public boundary. Each subsystem keeps its own enum for precise matching
/// close to where the error originates; this aggregates them for callers
/// (the Coordinator, CLI binaries) that just need one type to propagate.
#[derive(Debug, thiserror::Error)]
pub enum CortexError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("memory {id} not found")]
    MemoryNotFound { id: String },

    #[error(
        "concurrent modification: expected revision {expected}, found {actual} for memory {id}"
    )]
    ConcurrentModification {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("scope mismatch: operation scope does not match the stored memory's scope")]
    ScopeMismatch,

    #[error("degraded mode: {component} unavailable, falling back to {fallback}")]
    DegradedMode { component: String, fallback: String },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error(transparent)]
    QueueError(#[from] QueueError),

    #[error(transparent)]
    LlmError(#[from] LlmError),

    #[error(transparent)]
    EmbeddingError(#[from] EmbeddingError),

    #[error(transparent)]
    VectorError(#[from] VectorError),

    #[error(transparent)]
    ConsolidationError(#[from] ConsolidationError),

    #[error(transparent)]
    RetrievalError(#[from] RetrievalError),

    #[error(transparent)]
    CoordinatorError(#[from] CoordinatorError),
}

pub type CortexResult<T> = Result<T, CortexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_not_found_carries_id() {
        let err = CortexError::MemoryNotFound { id: "abc-123".into() };
        assert!(err.to_string().contains("abc-123"));
    }

    #[test]
    fn storage_error_converts_to_cortex_error() {
        let storage_err = StorageError::SqliteError { message: "disk full".into() };
        let cortex_err: CortexError = storage_err.into();
        assert!(matches!(cortex_err, CortexError::StorageError(_)));
    }

    #[test]
    fn embedding_error_converts_to_cortex_error() {
        let emb_err = EmbeddingError::DimensionMismatch { expected: 1536, actual: 384 };
        let cortex_err: CortexError = emb_err.into();
        assert!(matches!(cortex_err, CortexError::EmbeddingError(_)));
    }

    #[test]
    fn concurrent_modification_carries_both_revisions() {
        let err = CortexError::ConcurrentModification {
            id: "mem-1".into(),
            expected: 3,
            actual: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('5'));
    }
}
