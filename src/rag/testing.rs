//! In-process fakes for the two external services

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::EventPulseError;
use crate::errors::Result;
use crate::llm::GenerationParams;
use crate::llm::TextGenerator;
use crate::rag::SourceDocument;
use crate::vector_store::SimilaritySearch;

/// Replays queued completions in order and records every prompt it saw
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    params: Mutex<Vec<GenerationParams>>,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Self {
        let generator = Self::default();
        for reply in replies {
            generator.push_ok(reply);
        }
        generator
    }

    pub fn push_ok(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_err(&self, reason: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn params(&self) -> Vec<GenerationParams> {
        self.params.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.params.lock().unwrap().push(params);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(EventPulseError::GenerationUnavailable(reason)),
            None => Err(EventPulseError::GenerationUnavailable(
                "no scripted reply left".to_string(),
            )),
        }
    }
}

/// Serves a fixed document list, or fails like an unreachable index
pub struct RecordingStore {
    documents: Vec<SourceDocument>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl RecordingStore {
    pub fn with_documents(documents: Vec<SourceDocument>) -> Self {
        Self {
            documents,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            documents: Vec::new(),
            failure: Some(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SimilaritySearch for RecordingStore {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SourceDocument>> {
        self.calls.lock().unwrap().push((query.to_string(), k));
        if let Some(reason) = &self.failure {
            return Err(EventPulseError::RetrievalUnavailable(reason.clone()));
        }
        Ok(self.documents.clone())
    }
}

/// Talent profiles used across pipeline tests
pub fn musician_profiles(count: usize) -> Vec<SourceDocument> {
    (1..=count)
        .map(|i| {
            SourceDocument::new(
                format!("Musician {i}: guitarist available for weddings in Sydney, $120/h"),
                format!("talents/musician-{i}.md"),
            )
        })
        .collect()
}
