//! Client for OpenAI-compatible chat completion endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::GenerationParams;
use super::TextGenerator;
use crate::config::AppConfig;
use crate::errors::EventPulseError;
use crate::errors::Result;

/// Hosted language model reached over HTTP
///
/// Works against OpenAI and any server exposing the same `/chat/completions`
/// contract (Ollama's `/v1`, vLLM, LM Studio).
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmService {
    /// Create a new LLM service from application config
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()
            .map_err(|e| EventPulseError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.llm.endpoint.trim_end_matches('/').to_string(),
            api_key: config.llm.api_key.clone(),
            model: config.llm.model.clone(),
        })
    }

}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!(
            "Calling chat completions: {} (model={}, temperature={})",
            url, self.model, params.temperature
        );

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let mut builder = self.client.post(&url).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EventPulseError::GenerationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EventPulseError::GenerationUnavailable(format!(
                "LLM API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            EventPulseError::GenerationUnavailable(format!("Failed to parse response: {e}"))
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                EventPulseError::GenerationUnavailable("No completion in response".to_string())
            })
    }
}
