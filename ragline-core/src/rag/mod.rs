//! Retrieval Augmented Generation (RAG) pipeline.
//!
//! This module implements the retrieve → prompt → generate flow over a small
//! in-memory corpus.
//!
//! # Architecture
//!
//! - [`VectorIndex`]: exact nearest-neighbor index (squared L2)
//! - [`Retriever`]: maps index hits back to corpus documents
//! - [`PromptBuilder`]: assembles retrieved documents and the query
//! - [`RagPipeline`]: owns the index and corpus and orchestrates everything
//!
//! # How It Works
//!
//! 1. **Build**: every document is embedded and the embeddings are indexed.
//! 2. **Answer**: the query is embedded, the top-k closest documents are
//!    retrieved, a prompt is assembled and the generation model completes it.

mod embedder;
mod index;
mod prompt;
mod retriever;
mod types;

pub use index::VectorIndex;
pub use prompt::PromptBuilder;
pub use retriever::Retriever;
pub use types::{Answer, Document, Prompt, SearchResult};

use crate::config::Config;
use crate::provider::{
    create_providers, EmbeddingProvider, GenerationOptions, GenerationProvider, ProviderError,
};
use embedder::Embedder;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector index is empty")]
    EmptyIndex,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(#[source] ProviderError),

    #[error("Generation provider error: {0}")]
    GenerationProvider(#[source] ProviderError),

    #[error("Pipeline has not been built")]
    NotBuilt,
}

pub type Result<T> = std::result::Result<T, RagError>;

/// Tuning knobs for a [`RagPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Documents retrieved by [`RagPipeline::answer`]
    pub top_k: usize,
    /// Embedding calls in flight during [`RagPipeline::build`]
    pub embed_concurrency: usize,
    /// Character budget for the prompt context, unlimited when `None`
    pub max_context_chars: Option<usize>,
    pub generation: GenerationOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: 2,
            embed_concurrency: 4,
            max_context_chars: None,
            generation: GenerationOptions::default(),
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            top_k: config.rag.top_k,
            embed_concurrency: config.rag.embed_concurrency,
            max_context_chars: config.rag.max_context_chars,
            generation: config.llm.generation_options(),
        }
    }
}

/// The built state: an index and the documents it was built from.
#[derive(Debug)]
struct KnowledgeBase {
    index: VectorIndex,
    documents: Vec<Document>,
}

/// End-to-end RAG orchestrator.
///
/// A pipeline starts out empty. [`build`](Self::build) embeds and indexes a
/// corpus; afterwards [`answer`](Self::answer) can be called any number of
/// times. Answering only reads the index, so a built pipeline can be shared
/// behind an `Arc` and queried concurrently.
///
/// # Example
///
/// ```no_run
/// # use ragline_core::{Config, RagPipeline, corpus};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::load_or_default();
/// let mut pipeline = RagPipeline::from_config(&config)?;
/// pipeline.build(corpus::default_documents()).await?;
///
/// let answer = pipeline.answer("What is RAG?").await?;
/// println!("{}", answer);
/// # Ok(())
/// # }
/// ```
pub struct RagPipeline {
    embedder: Embedder,
    generator: Arc<dyn GenerationProvider>,
    prompt_builder: PromptBuilder,
    options: PipelineOptions,
    knowledge: Option<KnowledgeBase>,
}

impl RagPipeline {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        generation_provider: Arc<dyn GenerationProvider>,
        options: PipelineOptions,
    ) -> Self {
        let embedder = Embedder::new(embedding_provider, options.embed_concurrency);
        let prompt_builder = PromptBuilder::new().with_max_context_chars(options.max_context_chars);

        Self {
            embedder,
            generator: generation_provider,
            prompt_builder,
            options,
            knowledge: None,
        }
    }

    /// Creates an unbuilt pipeline using the providers selected in `config`.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ProviderError> {
        let (embedding_provider, generation_provider) = create_providers(config)?;
        Ok(Self::new(embedding_provider, generation_provider, config.into()))
    }

    /// Embeds and indexes `documents`, replacing any previously built index.
    ///
    /// The build is all-or-nothing: the previous index is discarded first, and
    /// on any error the pipeline is left unbuilt.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmbeddingProvider`] if any embedding call fails
    /// - [`RagError::DimensionMismatch`] if the provider returns embeddings of
    ///   differing lengths
    pub async fn build<I, D>(&mut self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = D>,
        D: Into<Document>,
    {
        self.knowledge = None;

        let documents: Vec<Document> = documents.into_iter().map(Into::into).collect();
        info!("Building index for {} documents", documents.len());

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(RagError::EmbeddingProvider)?;

        let index = VectorIndex::build(embeddings)?;
        info!(
            documents = index.len(),
            dim = index.dim().unwrap_or(0),
            "Index built"
        );

        self.knowledge = Some(KnowledgeBase { index, documents });
        Ok(())
    }

    /// Answers `query` using the configured `top_k`.
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        self.answer_with_k(query, self.options.top_k).await
    }

    /// Answers `query` with the `k` closest documents as context.
    ///
    /// # Errors
    ///
    /// - [`RagError::NotBuilt`] before a successful [`build`](Self::build)
    /// - [`RagError::EmbeddingProvider`] if the query cannot be embedded
    /// - retrieval errors ([`RagError::InvalidArgument`], [`RagError::EmptyIndex`],
    ///   [`RagError::DimensionMismatch`]) unchanged
    /// - [`RagError::GenerationProvider`] if generation fails
    pub async fn answer_with_k(&self, query: &str, k: usize) -> Result<Answer> {
        let knowledge = self.knowledge.as_ref().ok_or(RagError::NotBuilt)?;

        debug!("Generating query embedding for: {}", query);
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RagError::EmbeddingProvider)?;

        let retriever = Retriever::new(&knowledge.index, &knowledge.documents)?;
        let sources = retriever.search(query_embedding.as_slice(), k)?;
        info!("Retrieved {} documents for query", sources.len());
        for (rank, result) in sources.iter().enumerate() {
            debug!(
                "Result {}: index={}, distance={}",
                rank + 1,
                result.index,
                result.distance
            );
        }

        let prompt = self.prompt_builder.build(query, &sources);
        let completion = self
            .generator
            .generate(prompt.as_str(), &self.options.generation)
            .await
            .map_err(RagError::GenerationProvider)?;

        Ok(Answer {
            text: completion.trim().to_string(),
            sources,
        })
    }

    pub fn is_built(&self) -> bool {
        self.knowledge.is_some()
    }

    /// Number of indexed documents, zero while unbuilt.
    pub fn document_count(&self) -> usize {
        self.knowledge.as_ref().map_or(0, |kb| kb.documents.len())
    }

    /// The indexed corpus, in index order.
    pub fn documents(&self) -> &[Document] {
        self.knowledge
            .as_ref()
            .map(|kb| kb.documents.as_slice())
            .unwrap_or_default()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Embedding;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Looks embeddings up in a fixed table; unknown text is an API error.
    struct TableEmbedder(HashMap<String, Vec<f32>>);

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed(&self, text: &str) -> crate::provider::Result<Embedding> {
            self.0
                .get(text)
                .cloned()
                .map(Embedding::new)
                .ok_or_else(|| ProviderError::Api(format!("unknown text: {}", text)))
        }
    }

    /// Records prompts and echoes a padded canned reply.
    #[derive(Default)]
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerationProvider for RecordingGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> crate::provider::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("  generated answer \n".to_string())
        }
    }

    fn table(entries: &[(&str, Vec<f32>)]) -> Arc<TableEmbedder> {
        Arc::new(TableEmbedder(
            entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ))
    }

    #[tokio::test]
    async fn test_answer_before_build() {
        let pipeline = RagPipeline::new(
            table(&[]),
            Arc::new(RecordingGenerator::default()),
            PipelineOptions::default(),
        );

        assert!(!pipeline.is_built());
        assert!(matches!(pipeline.answer("q").await, Err(RagError::NotBuilt)));
    }

    #[tokio::test]
    async fn test_answer_trims_and_reports_sources() {
        let embedder = table(&[
            ("cats", vec![1.0, 0.0]),
            ("dogs", vec![0.0, 1.0]),
            ("query", vec![0.9, 0.1]),
        ]);
        let generator = Arc::new(RecordingGenerator::default());
        let mut pipeline = RagPipeline::new(embedder, generator.clone(), PipelineOptions::default());

        pipeline.build(["cats", "dogs"]).await.unwrap();
        let answer = pipeline.answer("query").await.unwrap();

        assert_eq!(answer.text, "generated answer");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[0].document.content, "cats");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("cats\ndogs"));
        assert!(prompts[0].ends_with("query"));
    }

    #[tokio::test]
    async fn test_build_failure_leaves_pipeline_unbuilt() {
        let embedder = table(&[("known", vec![1.0]), ("query", vec![1.0])]);
        let mut pipeline = RagPipeline::new(
            embedder,
            Arc::new(RecordingGenerator::default()),
            PipelineOptions::default(),
        );

        pipeline.build(["known"]).await.unwrap();
        assert!(pipeline.is_built());

        let err = pipeline.build(["known", "unknown"]).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingProvider(_)));
        assert!(!pipeline.is_built());
        assert_eq!(pipeline.document_count(), 0);
        assert!(matches!(pipeline.answer("query").await, Err(RagError::NotBuilt)));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_corpus() {
        let embedder = table(&[
            ("apples", vec![1.0, 0.0]),
            ("pears", vec![0.9, 0.1]),
            ("rivers", vec![0.0, 1.0]),
            ("lakes", vec![0.1, 0.9]),
            ("query", vec![1.0, 0.0]),
        ]);
        let mut pipeline = RagPipeline::new(
            embedder,
            Arc::new(RecordingGenerator::default()),
            PipelineOptions::default(),
        );

        pipeline.build(["apples", "pears"]).await.unwrap();
        pipeline.build(["rivers", "lakes", "pears"]).await.unwrap();

        assert!(pipeline.is_built());
        assert_eq!(pipeline.document_count(), 3);
        let contents: Vec<&str> = pipeline.documents().iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["rivers", "lakes", "pears"]);

        let answer = pipeline.answer_with_k("query", 3).await.unwrap();
        assert_eq!(answer.sources.len(), 3);
        assert_eq!(answer.sources[0].index, 2);
        assert_eq!(answer.sources[0].document.content, "pears");
        assert!(answer.sources.iter().all(|s| s.document.content != "apples"));
    }

    #[tokio::test]
    async fn test_build_dimension_mismatch() {
        let embedder = table(&[("short", vec![1.0]), ("long", vec![1.0, 2.0])]);
        let mut pipeline = RagPipeline::new(
            embedder,
            Arc::new(RecordingGenerator::default()),
            PipelineOptions::default(),
        );

        let err = pipeline.build(["short", "long"]).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 1, actual: 2 }));
        assert!(!pipeline.is_built());
    }

    #[tokio::test]
    async fn test_query_embedding_failure() {
        let embedder = table(&[("doc", vec![1.0])]);
        let generator = Arc::new(RecordingGenerator::default());
        let mut pipeline = RagPipeline::new(embedder, generator.clone(), PipelineOptions::default());
        pipeline.build(["doc"]).await.unwrap();

        let err = pipeline.answer("not in table").await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingProvider(_)));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_options_from_config() {
        let mut config = Config::default();
        config.rag.top_k = 3;
        config.rag.max_context_chars = Some(100);
        config.llm.max_tokens = 50;

        let options = PipelineOptions::from(&config);
        assert_eq!(options.top_k, 3);
        assert_eq!(options.max_context_chars, Some(100));
        assert_eq!(options.generation.max_tokens, 50);
    }
}
