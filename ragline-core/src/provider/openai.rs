//! OpenAI-compatible provider implementation.
//!
//! Talks to `/v1/embeddings` and `/v1/completions` with bearer auth. Works
//! against the OpenAI API as well as compatible gateways.

use super::types::*;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable consulted when `llm.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI-compatible HTTP API provider.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
    http_client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new provider, resolving the API key from config or the
    /// `OPENAI_API_KEY` environment variable.
    pub fn new(config: &crate::Config) -> Result<Self> {
        let api_key = config
            .llm
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ProviderError::Other(format!(
                    "No API key configured (set llm.api_key or {})",
                    API_KEY_ENV
                ))
            })?;

        Ok(Self {
            base_url: config.llm.base_url().trim_end_matches('/').to_string(),
            api_key,
            model: config.llm.model().to_string(),
            embedding_model: config.embedding_model().to_string(),
            http_client: reqwest::Client::new(),
        })
    }

    async fn post<T, R>(&self, path: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self.http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api(error_text));
        }

        read_json(response).await
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        debug!(model = %self.embedding_model, chars = text.len(), "Requesting OpenAI embedding");

        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            input: text,
        };
        let response: EmbeddingsResponse = self.post("/v1/embeddings", &request).await?;

        response.data
            .into_iter()
            .next()
            .map(|item| Embedding::new(item.embedding))
            .ok_or_else(|| ProviderError::Other("No embeddings returned".to_string()))
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        debug!(model = %self.model, "Requesting OpenAI completion");

        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };
        let response: CompletionResponse = self.post("/v1/completions", &request).await?;

        response.choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| ProviderError::Other("No completion choices returned".to_string()))
    }
}

// OpenAI-specific request/response types (internal)

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_api_key_is_used() {
        let mut config = crate::Config::default();
        config.llm.api_key = Some("sk-test".to_string());
        config.llm.base_url = Some("https://api.openai.com/".to_string());

        let provider = OpenAiProvider::new(&config).unwrap();
        assert_eq!(provider.api_key, "sk-test");
        assert_eq!(provider.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_parse_embeddings_response() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.5,-0.25]}]}"#;
        let response: EmbeddingsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data[0].embedding, vec![0.5, -0.25]);
    }

    #[test]
    fn test_parse_completion_response() {
        let body = r#"{"choices":[{"text":"  RAG combines retrieval and generation.\n","index":0}]}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].text, "  RAG combines retrieval and generation.\n");
    }
}
