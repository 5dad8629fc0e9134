use async_trait::async_trait;
use cortex_core::errors::EmbeddingError;
use cortex_core::traits::{EmbedResult, EmbeddingProvider};
use cortex_core::CortexResult;

use crate::truncation::truncate_to_token_budget;

/// Deterministic hash-based provider for tests: derives a unit vector from
/// blake3(text) so the same input always embeds to the same output, without
/// any network access.
pub struct HashEmbeddingProvider {
    dimensions: usize,
    max_input_tokens: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize, max_input_tokens: usize) -> Self {
        Self {
            dimensions,
            max_input_tokens,
        }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return vec![0.0; self.dimensions];
        }
        let truncated = truncate_to_token_budget(text, self.max_input_tokens);
        let hash = blake3::hash(truncated.as_bytes());
        let bytes = hash.as_bytes();
        (0..self.dimensions)
            .map(|i| {
                let b = bytes[i % bytes.len()];
                (b as f32 / 255.0) * 2.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed_one(&self, text: &str) -> CortexResult<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    async fn embed_many(&self, texts: &[String]) -> CortexResult<EmbedResult> {
        if texts.is_empty() {
            return Err(EmbeddingError::BatchFailed {
                batch_size: 0,
                reason: "empty batch".to_string(),
            }
            .into());
        }
        let vectors = texts.iter().map(|t| Some(self.vector_for(t))).collect();
        Ok(EmbedResult {
            vectors,
            model_id: self.model_id().to_string(),
            error: None,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        "mock-hash-embedding-v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let provider = HashEmbeddingProvider::new(16, 1000);
        let a = provider.embed_one("hello world").await.unwrap();
        let b = provider.embed_one("hello world").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn empty_text_is_zero_vector() {
        let provider = HashEmbeddingProvider::new(16, 1000);
        let v = provider.embed_one("   ").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn embed_many_preserves_order() {
        let provider = HashEmbeddingProvider::new(8, 1000);
        let texts = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let result = provider.embed_many(&texts).await.unwrap();
        assert_eq!(result.vectors[0], result.vectors[2]);
        assert_ne!(result.vectors[0], result.vectors[1]);
    }

    #[tokio::test]
    async fn vectors_have_declared_dimension() {
        let provider = HashEmbeddingProvider::new(32, 1000);
        let v = provider.embed_one("some text").await.unwrap();
        assert_eq!(v.len(), 32);
    }
}
