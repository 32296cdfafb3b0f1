//! ragline - Minimal retrieval-augmented generation
//!
//! This is the convenience wrapper crate that re-exports `ragline-core`.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! ragline = "0.1"
//! ```
//!
//! Custom providers implement [`EmbeddingProvider`] and
//! [`GenerationProvider`] with the re-exported [`async_trait`] attribute.

// Re-export core
pub use ragline_core::*;

/// Re-exported so custom providers don't need their own `async-trait` dependency.
pub use async_trait::async_trait;

/// Prelude module for convenient imports
pub mod prelude {
    pub use async_trait::async_trait;
    pub use ragline_core::corpus;
    pub use ragline_core::{
        Answer, Config, Document, Embedding, EmbeddingProvider, GenerationOptions,
        GenerationProvider, PipelineOptions, ProviderError, RagError, RagPipeline,
    };
}
