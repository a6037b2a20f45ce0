//! Text-generation module
//!
//! The pipeline talks to the language model only through [`TextGenerator`], so the
//! hosted completion API ([`LlmService`]) can be swapped for any other backend.

pub mod prompts;
pub mod service;

use async_trait::async_trait;

pub use prompts::PromptTemplate;
pub use prompts::RagPrompts;
pub use service::LlmService;

use crate::errors::Result;

/// Sampling parameters for a single generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl GenerationParams {
    /// Zero-temperature sampling, used for both pipeline stages by default
    #[must_use]
    pub const fn deterministic(max_tokens: usize) -> Self {
        Self {
            temperature: 0.0,
            max_tokens,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::deterministic(1024)
    }
}

/// Anything that can turn a fully rendered prompt into generated text
///
/// Implementations report transport or service failures as
/// [`crate::EventPulseError::GenerationUnavailable`] and never retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String>;
}
