//! The two generation capabilities the workflow consumes.

use std::time::Instant;

use tracing::{debug, error};

use crate::backend::SharedBackend;
use crate::error::Result;
use crate::types::CompletionRequest;

/// Default model requested from the backend.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default output cap for summaries.
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 150;

/// Default output cap for answers.
pub const DEFAULT_ANSWER_MAX_TOKENS: u32 = 50;

/// Generation settings shared by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub summary_max_tokens: u32,
    pub answer_max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
            answer_max_tokens: DEFAULT_ANSWER_MAX_TOKENS,
            temperature: None,
        }
    }
}

impl GenerationConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_summary_max_tokens(mut self, tokens: u32) -> Self {
        self.summary_max_tokens = tokens;
        self
    }

    pub fn with_answer_max_tokens(mut self, tokens: u32) -> Self {
        self.answer_max_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Prompt for summarizing a document.
pub fn summarize_prompt(text: &str) -> String {
    format!("summarize: {}", text)
}

/// Prompt for answering a question about a document.
pub fn answer_prompt(question: &str, context: &str) -> String {
    format!("question: {} context: {}", question, context)
}

/// Summarization and question answering over one shared backend.
///
/// The backend is built once at startup and shared read-only by every
/// request; cloning the client clones the handle, not the backend.
#[derive(Clone)]
pub struct GenerationClient {
    backend: SharedBackend,
    config: GenerationConfig,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

impl GenerationClient {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            config: GenerationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Summarize a document's text.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let request = self.request(summarize_prompt(text), self.config.summary_max_tokens);
        self.generate("summarize", request).await
    }

    /// Answer `question` using `context` as grounding.
    pub async fn ask(&self, question: &str, context: &str) -> Result<String> {
        let request = self.request(answer_prompt(question, context), self.config.answer_max_tokens);
        self.generate("ask", request).await
    }

    /// Check that the backend is reachable.
    pub async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await
    }

    fn request(&self, prompt: String, max_tokens: u32) -> CompletionRequest {
        let mut request = CompletionRequest::new(self.config.model.clone(), prompt, max_tokens);
        request.temperature = self.config.temperature;
        request
    }

    async fn generate(&self, operation: &'static str, request: CompletionRequest) -> Result<String> {
        let started = Instant::now();

        match self.backend.complete(request).await {
            Ok(response) => {
                debug!(
                    backend = self.backend.name(),
                    operation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    output_tokens = response.usage.output_tokens,
                    truncated = response.truncated(),
                    "Generation finished"
                );
                Ok(response.text.trim().to_string())
            }
            Err(e) => {
                error!(
                    backend = self.backend.name(),
                    operation,
                    error = %e,
                    "Generation failed"
                );
                Err(e)
            }
        }
    }
}
