//! ragline-core - Retrieval-augmented generation core
//!
//! Provides the building blocks of a small RAG pipeline:
//! - Provider abstraction for embeddings and text generation (Ollama, OpenAI)
//! - Exact nearest-neighbor vector index and retriever
//! - Prompt assembly and the end-to-end `RagPipeline`
//! - Configuration and corpus loading
//!
//! ## Primary API
//!
//! Build a [`RagPipeline`] once over a corpus, then call
//! [`RagPipeline::answer`] for every query.

// Public modules
pub mod config;
pub mod corpus;
pub mod provider;
pub mod rag;

// Public exports
pub use config::{Config, ConfigError, CorpusConfig, LlmConfig, ProviderKind, RagConfig};
pub use rag::{
    Answer, Document, PipelineOptions, Prompt, PromptBuilder, RagError, RagPipeline, Retriever,
    SearchResult, VectorIndex,
};

// Provider exports
pub use provider::{
    create_providers, Embedding, EmbeddingProvider, GenerationOptions, GenerationProvider,
    ProviderError,
};
