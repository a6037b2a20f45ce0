use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::EventPulseError;
use crate::rag::context::DEFAULT_MAX_CONTEXT_LENGTH;
use crate::rag::retriever::DEFAULT_TOP_K;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Sampling temperature shared by the condense and answer calls
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> usize {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// "openai" or "ollama"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Index host, e.g. `https://talents-abc123.svc.us-east1-gcp.pinecone.io`
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Metadata key holding the page content
    #[serde(default = "default_text_key")]
    pub text_key: String,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_text_key() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Thread prior turns into the condense step
    #[serde(default)]
    pub use_chat_history: bool,
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,
    /// Byte budget for the answer prompt's `{context}`; documents that do not fit are dropped
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,
}

fn default_max_history_turns() -> usize {
    10
}

fn default_max_context_length() -> usize {
    DEFAULT_MAX_CONTEXT_LENGTH
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_chat_history: false,
            max_history_turns: default_max_history_turns(),
            max_context_length: default_max_context_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
    /// When set, `/api/chat` requires a matching `X-CSRF-Token` header
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_timeout_secs() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: false,
            csrf_token: None,
            session_timeout_secs: default_session_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,
}

pub(crate) fn default_cities() -> Vec<String> {
    ["Sydney", "Melbourne", "Brisbane", "Perth", "Adelaide", "Gold Coast"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_max_query_chars() -> usize {
    512
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            cities: default_cities(),
            max_query_chars: default_max_query_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, then fill empty secrets from the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(EventPulseError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Fill empty secrets from `OPENAI_API_KEY` / `PINECONE_API_KEY`
    pub fn apply_env_overrides(&mut self) {
        self.apply_key_overrides(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("PINECONE_API_KEY").ok(),
        );
    }

    /// Keys set in the file always win over the supplied ones
    pub fn apply_key_overrides(&mut self, openai_key: Option<String>, pinecone_key: Option<String>) {
        if let Some(key) = openai_key.filter(|k| !k.is_empty()) {
            if self.llm.api_key.is_empty() {
                self.llm.api_key = key.clone();
            }
            if self.embeddings.api_key.is_empty() {
                self.embeddings.api_key = key;
            }
        }
        if let Some(key) = pinecone_key.filter(|k| !k.is_empty()) {
            if self.vector_store.api_key.is_empty() {
                self.vector_store.api_key = key;
            }
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.vector_store.top_k == 0 {
            return Err(EventPulseError::ConfigError(
                "vector_store.top_k must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(EventPulseError::ConfigError(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        for (name, endpoint) in [
            ("llm.endpoint", &self.llm.endpoint),
            ("embeddings.endpoint", &self.embeddings.endpoint),
            ("vector_store.endpoint", &self.vector_store.endpoint),
        ] {
            if endpoint.trim().is_empty() {
                return Err(EventPulseError::ConfigError(format!(
                    "{name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            llm: LlmConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: String::new(),
                model: default_llm_model(),
                temperature: 0.0,
                max_tokens: default_max_tokens(),
                timeout_secs: default_timeout_secs(),
            },
            embeddings: EmbeddingsConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: String::new(),
                model: default_embedding_model(),
                provider: default_embedding_provider(),
            },
            vector_store: VectorStoreConfig {
                endpoint: "http://localhost:5080".to_string(),
                api_key: String::new(),
                namespace: None,
                top_k: default_top_k(),
                text_key: default_text_key(),
            },
            pipeline: PipelineConfig::default(),
            server: ServerConfig::default(),
            surface: SurfaceConfig::default(),
        }
    }
}
