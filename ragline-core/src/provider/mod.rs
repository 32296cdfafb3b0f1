//! Model provider abstraction layer.
//!
//! This module defines the two external collaborators of the pipeline,
//! embedding and text generation, and HTTP backends implementing them
//! (Ollama, OpenAI-compatible).

mod types;
pub mod ollama;
pub mod openai;

// Re-export common types
pub use types::{
    Embedding,
    EmbeddingProvider,
    GenerationOptions,
    GenerationProvider,
    ProviderError,
    Result,
};

// Re-export provider implementations
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::{Config, ProviderKind};
use std::sync::Arc;

/// Creates the embedding and generation providers selected by `llm.provider`.
///
/// Both backends serve embeddings and completions from the same endpoint, so
/// the two handles share one client.
pub fn create_providers(
    config: &Config,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn GenerationProvider>)> {
    match config.llm.provider {
        ProviderKind::Ollama => {
            let provider = Arc::new(OllamaProvider::new(config));
            Ok((
                provider.clone() as Arc<dyn EmbeddingProvider>,
                provider as Arc<dyn GenerationProvider>,
            ))
        }
        ProviderKind::OpenAi => {
            let provider = Arc::new(OpenAiProvider::new(config)?);
            Ok((
                provider.clone() as Arc<dyn EmbeddingProvider>,
                provider as Arc<dyn GenerationProvider>,
            ))
        }
    }
}
