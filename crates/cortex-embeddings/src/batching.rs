use cortex_core::traits::{EmbedResult, EmbeddingProvider};
use cortex_core::CortexResult;
use tracing::warn;

/// Embed `texts` in chunks of `batch_size`. A chunk whose `embed_many` call
/// fails outright is retried once at `batch_size / 4`; if that smaller
/// attempt also fails, the chunk's entries are left unembedded (`None`) and
/// a warning is logged, per the retry-then-skip policy for batch failures.
pub async fn embed_batched(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> CortexResult<Vec<EmbedResult>> {
    let batch_size = batch_size.max(1);
    let mut results = Vec::new();

    for chunk in texts.chunks(batch_size) {
        let outcome = provider.embed_many(chunk).await;
        let chunk_failed = match &outcome {
            Ok(result) => result.error.is_some(),
            Err(_) => true,
        };

        if !chunk_failed {
            results.push(outcome.unwrap());
            continue;
        }

        if chunk.len() == 1 {
            results.push(failure_result(provider, chunk.len(), &outcome));
            continue;
        }

        let retry_size = (chunk.len() / 4).max(1);
        warn!(
            chunk_len = chunk.len(),
            retry_size, "batch embedding failed, retrying at reduced size"
        );
        for smaller in chunk.chunks(retry_size) {
            let retry_outcome = provider.embed_many(smaller).await;
            let retry_failed = match &retry_outcome {
                Ok(result) => result.error.is_some(),
                Err(_) => true,
            };
            if retry_failed {
                warn!(
                    chunk_len = smaller.len(),
                    "reduced-size batch also failed, skipping"
                );
                results.push(failure_result(provider, smaller.len(), &retry_outcome));
            } else {
                results.push(retry_outcome.unwrap());
            }
        }
    }

    Ok(results)
}

fn failure_result(
    provider: &dyn EmbeddingProvider,
    size: usize,
    outcome: &CortexResult<EmbedResult>,
) -> EmbedResult {
    let error = match outcome {
        Ok(result) => result.error.clone().unwrap_or_default(),
        Err(e) => e.to_string(),
    };
    EmbedResult {
        vectors: vec![None; size],
        model_id: provider.model_id().to_string(),
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::HashEmbeddingProvider;

    #[tokio::test]
    async fn single_batch_embeds_all() {
        let provider = HashEmbeddingProvider::new(8, 1000);
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = embed_batched(&provider, &texts, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].vectors.len(), 3);
        assert!(results[0].vectors.iter().all(Option::is_some));
    }

    #[tokio::test]
    async fn splits_into_multiple_chunks() {
        let provider = HashEmbeddingProvider::new(8, 1000);
        let texts: Vec<String> = (0..10).map(|i| format!("text-{i}")).collect();
        let results = embed_batched(&provider, &texts, 4).await.unwrap();
        assert_eq!(results.len(), 3);
        let total: usize = results.iter().map(|r| r.vectors.len()).sum();
        assert_eq!(total, 10);
    }
}
