use crate::provider::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for the whole pipeline.
///
/// Every section falls back to its defaults when omitted from the YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// Which backend serves embeddings and completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    OpenAi,
}

impl ProviderKind {
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Ollama => "http://localhost:11434",
            ProviderKind::OpenAi => "https://api.openai.com",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Ollama => "llama3.2:1b",
            ProviderKind::OpenAi => "gpt-3.5-turbo-instruct",
        }
    }

    pub fn default_embedding_model(self) -> &'static str {
        match self {
            ProviderKind::Ollama => "nomic-embed-text",
            ProviderKind::OpenAi => "text-embedding-ada-002",
        }
    }
}

/// Configuration for the generation model
///
/// `model` and `base_url` fall back to the defaults of the selected provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Only used by the OpenAI provider; falls back to `OPENAI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            model: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 200,
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions::default()
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }
}

/// Configuration for embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Falls back to the default embedding model of `llm.provider`.
    pub embedding_model: Option<String>,
    /// Number of documents retrieved per query
    pub top_k: usize,
    /// Maximum number of embedding requests in flight while building the index
    pub embed_concurrency: usize,
    /// Character budget for the context section of the prompt
    pub max_context_chars: Option<usize>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: None,
            top_k: 2,
            embed_concurrency: 4,
            max_context_chars: None,
        }
    }
}

/// Where the documents come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Text file with one document per line. The built-in corpus is used when unset.
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `config.yaml` if it exists, otherwise use defaults.
    pub fn load_or_default() -> Self {
        Self::load("config.yaml").unwrap_or_default()
    }

    /// Embedding model name, resolved against the selected provider.
    pub fn embedding_model(&self) -> &str {
        self.rag
            .embedding_model
            .as_deref()
            .unwrap_or_else(|| self.llm.provider.default_embedding_model())
    }

    /// Returns a copy with every provider-dependent field filled in.
    pub fn resolved(&self) -> Self {
        let mut config = self.clone();
        config.llm.model = Some(self.llm.model().to_string());
        config.llm.base_url = Some(self.llm.base_url().to_string());
        config.rag.embedding_model = Some(self.embedding_model().to_string());
        config
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rag.top_k == 0 {
            return Err(ConfigError::Invalid("rag.top_k must be at least 1".to_string()));
        }
        if self.rag.embed_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "rag.embed_concurrency must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be within [0, 1], got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}
