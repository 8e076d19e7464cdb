//! Backend trait and the in-process mock.
//!
//! A backend turns one prompt into one piece of generated text. The
//! OpenAI-compatible HTTP backend lives in [`crate::openai`]; [`MockBackend`]
//! answers from a queue or a closure and is what the server tests run against.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, CompletionResponse, StopReason, Usage};

// ─────────────────────────────────────────────────────────────────────────────
// Shared Retry Logic
// ─────────────────────────────────────────────────────────────────────────────

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors (network failures). Non-retryable errors
/// are returned immediately.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = initial_backoff;
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() || attempt >= max_retries => return Err(e),
            Err(e) => {
                attempt += 1;
                tracing::warn!(
                    backend = backend_name,
                    attempt,
                    max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A text generation provider.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Execute a completion request and return the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Check if the backend is available and properly configured.
    async fn health_check(&self) -> Result<()>;
}

/// Shared handle to a backend.
pub type SharedBackend = Arc<dyn LlmBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

type Responder = dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync;

/// A mock backend for testing purposes.
///
/// Queued responses are returned first, in order. Once the queue is empty the
/// responder closure (if any) produces the text; without one, the request
/// fails with a backend error.
pub struct MockBackend {
    name: String,
    responses: Mutex<VecDeque<Result<CompletionResponse>>>,
    responder: Option<Box<Responder>>,
    request_log: Mutex<Vec<CompletionRequest>>,
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            responder: None,
            request_log: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![text_response(text.into())])
    }

    /// Create a mock backend that returns each text once, in order.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| text_response(t.into())).collect())
    }

    /// Create a mock backend that computes every answer from the request.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        let mut backend = Self::new(Vec::new());
        backend.responder = Some(Box::new(responder));
        backend
    }

    /// Create a mock backend whose every request fails.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_responder(move |_| Err(LlmError::Backend(message.clone())))
    }

    /// Queue a failure ahead of the responder.
    pub fn push_error(&self, error: LlmError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.request_log.lock().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().len()
    }
}

impl fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBackend")
            .field("name", &self.name)
            .field("queued", &self.responses.lock().len())
            .field("has_responder", &self.responder.is_some())
            .field("requests", &self.request_log.lock().len())
            .finish()
    }
}

fn text_response(text: String) -> CompletionResponse {
    CompletionResponse::new(
        "mock_msg",
        "mock-model",
        text,
        StopReason::EndTurn,
        Usage::new(10, 20),
    )
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.request_log.lock().push(request.clone());

        if let Some(queued) = self.responses.lock().pop_front() {
            return queued;
        }

        match &self.responder {
            Some(responder) => responder(&request).map(text_response),
            None => Err(LlmError::Backend(
                "MockBackend: no more responses available".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
