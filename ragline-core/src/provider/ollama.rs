//! Ollama provider implementation.
//!
//! This module provides an Ollama HTTP API client that implements both
//! provider traits.

use super::types::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ollama HTTP API provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    embedding_model: String,
    http_client: reqwest::Client,
}

impl OllamaProvider {
    /// Creates a new Ollama provider with the specified config.
    pub fn new(config: &crate::Config) -> Self {
        Self {
            base_url: config.llm.base_url().trim_end_matches('/').to_string(),
            model: config.llm.model().to_string(),
            embedding_model: config.embedding_model().to_string(),
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        let config = crate::Config::default();
        Self::new(&config)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let url = format!("{}/api/embed", self.base_url);
        debug!(model = %self.embedding_model, chars = text.len(), "Requesting Ollama embedding");

        let embed_request = OllamaEmbedRequest {
            model: self.embedding_model.clone(),
            input: text.to_string(),
        };

        let response = self.http_client
            .post(&url)
            .json(&embed_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api(error_text));
        }

        let embed_response: OllamaEmbedResponse = read_json(response).await?;

        embed_response.embeddings
            .into_iter()
            .next()
            .map(Embedding::new)
            .ok_or_else(|| ProviderError::Other("No embeddings returned".to_string()))
    }
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, "Requesting Ollama completion");

        let generate_request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let response = self.http_client
            .post(&url)
            .json(&generate_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api(error_text));
        }

        let generate_response: OllamaGenerateResponse = read_json(response).await?;
        Ok(generate_response.response)
    }
}

// Ollama-specific request/response types (internal)

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaEmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}
