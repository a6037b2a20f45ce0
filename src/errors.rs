use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventPulseError {
    /// Similarity-search service unreachable or erroring
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Text-generation service unreachable or erroring
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Missing question or location qualifier at the boundary
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The session already has a request awaiting the pipeline
    #[error("Request already in progress: {0}")]
    RequestInProgress(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl EventPulseError {
    /// Whether the failure came from one of the external services rather than the caller
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::RetrievalUnavailable(_) | Self::GenerationUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EventPulseError>;
