//! Embedding generation on top of an [`EmbeddingProvider`].

use crate::provider::{Embedding, EmbeddingProvider, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

/// Converts documents and queries into embeddings.
///
/// Batch embedding keeps up to `concurrency` provider calls in flight and
/// yields results in input order.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    concurrency: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        self.provider.embed(text).await
    }

    /// Embeds every text, returning embedding *i* for `texts[i]`.
    ///
    /// Fails on the first provider error; in-flight requests are dropped.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        debug!(count = texts.len(), concurrency = self.concurrency, "Embedding batch");

        stream::iter(texts.iter().copied())
            .map(|text| self.provider.embed(text))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Embeds text as `[len]`, sleeping longer for earlier texts so calls
    /// complete out of order.
    struct SlowFirstProvider;

    #[async_trait]
    impl EmbeddingProvider for SlowFirstProvider {
        async fn embed(&self, text: &str) -> Result<Embedding> {
            let delay = 40u64.saturating_sub(text.len() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if text == "fail" {
                return Err(ProviderError::Api("quota exceeded".to_string()));
            }
            Ok(Embedding::new(vec![text.len() as f32]))
        }
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let embedder = Embedder::new(Arc::new(SlowFirstProvider), 4);

        let embeddings = embedder.embed_batch(&["a", "bb", "ccc", "dddd"]).await.unwrap();
        let lengths: Vec<f32> = embeddings.iter().map(|e| e.as_slice()[0]).collect();
        assert_eq!(lengths, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_embed_batch_fails_fast() {
        let embedder = Embedder::new(Arc::new(SlowFirstProvider), 2);

        let result = embedder.embed_batch(&["a", "fail", "ccc"]).await;
        assert!(matches!(result, Err(ProviderError::Api(_))));
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let embedder = Embedder::new(Arc::new(SlowFirstProvider), 0);
        assert_eq!(embedder.concurrency, 1);
    }
}
