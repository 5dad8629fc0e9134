/// Scoped retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("query embedding failed: {reason}")]
    QueryEmbeddingFailed { reason: String },

    #[error("search failed: {reason}")]
    SearchFailed { reason: String },

    #[error("invalid limit: {limit} exceeds maximum {max}")]
    InvalidLimit { limit: usize, max: usize },
}
