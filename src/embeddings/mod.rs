//! Query embedding module
//!
//! The similarity-search index stores one vector per talent profile; queries are
//! embedded with the same model before being sent to the index. Supported providers:
//! - OpenAI (text-embedding-ada-002, text-embedding-3-small, etc.)
//! - Ollama (local models)

pub mod client;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use crate::errors::EventPulseError;
use crate::errors::Result;

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = match config.embeddings.provider.to_ascii_lowercase().as_str() {
            "openai" => EmbeddingProvider::OpenAI,
            "ollama" => EmbeddingProvider::Ollama,
            other => {
                return Err(EventPulseError::ConfigError(format!(
                    "Unknown embedding provider: {other}"
                )))
            }
        };

        let api_key = if config.embeddings.api_key.is_empty() {
            None
        } else {
            Some(config.embeddings.api_key.clone())
        };

        Ok(Self {
            provider,
            model: config.embeddings.model.clone(),
            endpoint: config.embeddings.endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}
