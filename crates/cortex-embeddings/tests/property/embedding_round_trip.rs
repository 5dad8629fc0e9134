//! §8 property: for any non-empty text, `embed_many` returns a vector whose
//! length matches the provider's declared dimension, and the same text
//! pinned to the same `embedding_model_id` always reproduces the same
//! vector.

use cortex_core::traits::EmbeddingProvider;
use cortex_embeddings::HashEmbeddingProvider;
use proptest::prelude::*;

proptest! {
    #[test]
    fn non_empty_text_embeds_to_the_declared_dimension(
        dimensions in 1usize..64,
        text in "[a-zA-Z0-9 ]{1,80}",
    ) {
        prop_assume!(!text.trim().is_empty());
        let rt = tokio::runtime::Runtime::new().unwrap();
        let provider = HashEmbeddingProvider::new(dimensions, 1000);

        let result = rt.block_on(provider.embed_many(&[text])).unwrap();
        prop_assert_eq!(result.model_id, provider.model_id());

        let vector = result.vectors[0].as_ref().expect("non-empty input must embed");
        prop_assert_eq!(vector.len(), dimensions);
    }

    #[test]
    fn the_same_text_reproduces_the_same_vector_under_a_pinned_model(
        dimensions in 1usize..64,
        text in "[a-zA-Z0-9 ]{1,80}",
    ) {
        prop_assume!(!text.trim().is_empty());
        let rt = tokio::runtime::Runtime::new().unwrap();
        let provider = HashEmbeddingProvider::new(dimensions, 1000);

        let first = rt.block_on(provider.embed_one(&text)).unwrap();
        let second = rt.block_on(provider.embed_one(&text)).unwrap();

        prop_assert_eq!(first, second);
    }
}
