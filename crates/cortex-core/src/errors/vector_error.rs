/// Vector Store Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("collection {collection} not found")]
    CollectionNotFound { collection: String },

    #[error("point dimension mismatch: collection expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("upsert failed: {reason}")]
    UpsertFailed { reason: String },

    #[error("search failed: {reason}")]
    SearchFailed { reason: String },

    #[error("transport error: {reason}")]
    Transport { reason: String },
}
