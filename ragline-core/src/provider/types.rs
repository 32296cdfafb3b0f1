//! Common types for model providers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when interacting with a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Provider error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Decodes a response body, reporting malformed payloads as [`ProviderError::Json`].
pub(crate) async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
    let body = response.text().await?;
    decode(&body)
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R> {
    Ok(serde_json::from_str(body)?)
}

/// A fixed-length vector representing the semantics of one piece of text.
///
/// Providers hand back `Embedding` values rather than raw response payloads,
/// so the pipeline never depends on a particular provider's JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Number of components (the dimensionality).
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Sampling settings passed along with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Upper bound on the length of the completion, in tokens.
    pub max_tokens: u32,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            temperature: 0.7,
        }
    }
}

impl GenerationOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Converts text into an [`Embedding`].
///
/// Dimensionality is provider-defined but must stay the same across every
/// call made for one pipeline.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Produces a text completion for a prompt.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// The returned text is untrimmed; callers decide how to post-process it.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Reply {
        text: String,
    }

    #[test]
    fn test_decode_valid_body() {
        let reply: Reply = decode(r#"{"text":"ok"}"#).unwrap();
        assert_eq!(reply.text, "ok");
    }

    #[test]
    fn test_decode_malformed_body_is_json_error() {
        let err = decode::<Reply>("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Json(_)));

        let err = decode::<Reply>(r#"{"other":1}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Json(_)));
    }

    #[test]
    fn test_generation_options_builders() {
        let options = GenerationOptions::default()
            .with_max_tokens(32)
            .with_temperature(0.1);
        assert_eq!(options.max_tokens, 32);
        assert_eq!(options.temperature, 0.1);
    }
}
