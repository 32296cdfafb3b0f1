//! Corpus loading.
//!
//! A corpus is an ordered list of [`Document`]s. It either comes from the
//! built-in knowledge base or from a text file holding one document per line.

use crate::rag::Document;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CorpusError>;

const BUILTIN_DOCUMENTS: [&str; 5] = [
    "RAG is an AI model architecture that combines retrieval and generation.",
    "The retriever extracts relevant information from the knowledge base.",
    "The generator uses the context to produce a natural language answer.",
    "OpenAI's GPT is a powerful generator.",
    "Vector databases such as FAISS are widely used for efficient retrieval.",
];

/// The small built-in knowledge base used when no corpus file is configured.
pub fn default_documents() -> Vec<Document> {
    BUILTIN_DOCUMENTS
        .iter()
        .map(|text| Document::new(*text).with_metadata("source", "builtin"))
        .collect()
}

/// Reads one document per non-blank line of `path`.
///
/// Lines are trimmed. Each document records its `source` path and 1-based
/// `line` number as metadata.
pub async fn load_documents(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).await?;
    let source = path.to_string_lossy().to_string();

    let documents: Vec<Document> = content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line_text = line.trim();
            if line_text.is_empty() {
                return None;
            }
            Some(
                Document::new(line_text)
                    .with_metadata("source", source.as_str())
                    .with_metadata("line", (i + 1).to_string()),
            )
        })
        .collect();

    debug!(path = %source, count = documents.len(), "Loaded corpus file");
    Ok(documents)
}

/// Loads the configured corpus, or the built-in one when no path is set.
pub async fn load_configured(config: &crate::config::CorpusConfig) -> Result<Vec<Document>> {
    match &config.path {
        Some(path) => load_documents(path).await,
        None => Ok(default_documents()),
    }
}
