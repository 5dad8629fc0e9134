/// LLM Adapter errors, already classified into the adapter's retry policy.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("transient upstream error: {reason}")]
    Transient { reason: String },

    #[error("permanent upstream error: {reason}")]
    Permanent { reason: String },

    #[error("response violated the requested schema: {reason}")]
    SchemaViolation { reason: String },

    #[error("response body was not parseable JSON: {reason}")]
    Unparseable { reason: String },

    #[error("retry budget of {attempts} attempts exhausted")]
    RetriesExhausted { attempts: u32 },
}
