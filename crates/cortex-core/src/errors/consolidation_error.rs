/// Consolidation stage errors.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    #[error("similarity computation failed: {reason}")]
    SimilarityFailed { reason: String },

    #[error("merge strategy {strategy} could not resolve a winner: {reason}")]
    MergeUnresolved { strategy: String, reason: String },

    #[error("batch of {size} memories exceeds max_consolidation_batch {max}")]
    BatchTooLarge { size: usize, max: usize },
}
