use std::collections::HashMap;
use std::fmt;

/// A document in the corpus.
///
/// Documents are identified by their position in the corpus; the pipeline
/// never mutates them after loading. Metadata is informational only and never
/// influences retrieval.
///
/// # Example
///
/// ```
/// # use ragline_core::rag::Document;
/// let doc = Document::new("Hello world")
///     .with_metadata("source", "user_input");
/// assert_eq!(doc.metadata["source"], "user_input");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: String,
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl AsRef<Document> for Document {
    fn as_ref(&self) -> &Document {
        self
    }
}

impl From<&str> for Document {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Document {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// A retrieved document with its corpus position and distance to the query.
///
/// Distances are squared Euclidean: `0.0` is an exact match and smaller is
/// more relevant. Results are ordered by ascending distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub index: usize,
    pub document: Document,
    pub distance: f32,
}

impl AsRef<Document> for SearchResult {
    fn as_ref(&self) -> &Document {
        &self.document
    }
}

/// The fully assembled text sent to the generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The generated answer to one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Trimmed completion text.
    pub text: String,
    /// Documents given to the model as context, in retrieval order.
    pub sources: Vec<SearchResult>,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
