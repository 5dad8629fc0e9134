use async_trait::async_trait;

use crate::errors::CortexResult;

/// Outcome of a batched embedding call. `vectors` is the same length and
/// order as the input; a `None` entry marks an input whose embedding could
/// not be produced (e.g. its sub-batch failed and was not retried further).
#[derive(Debug, Clone)]
pub struct EmbedResult {
    pub vectors: Vec<Option<Vec<f32>>>,
    pub model_id: String,
    pub error: Option<String>,
}

/// Batch text-to-vector provider with a fixed declared output dimension.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_one(&self, text: &str) -> CortexResult<Vec<f32>>;

    async fn embed_many(&self, texts: &[String]) -> CortexResult<EmbedResult>;

    /// Fixed output dimension declared by this provider's model.
    fn dimensions(&self) -> usize;

    fn model_id(&self) -> &str;
}
