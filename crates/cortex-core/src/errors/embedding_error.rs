/// Embedding Adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("transient upstream error: {reason}")]
    Transient { reason: String },

    #[error("permanent upstream error: {reason}")]
    Permanent { reason: String },

    #[error("batch of {batch_size} items failed: {reason}")]
    BatchFailed { batch_size: usize, reason: String },

    #[error("retry budget of {attempts} attempts exhausted")]
    RetriesExhausted { attempts: u32 },
}
