/// Memory Coordinator orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("job {id} carries an unsupported payload for kind {kind}")]
    UnsupportedPayload { id: String, kind: String },

    #[error("concurrent modification retry budget of {attempts} exhausted for memory {memory_id}")]
    RetryBudgetExhausted { memory_id: String, attempts: u32 },

    #[error("job {id} was cancelled")]
    Cancelled { id: String },
}
