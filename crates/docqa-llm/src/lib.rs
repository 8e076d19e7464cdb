//! Text generation for docqa.
//!
//! The workflow needs exactly two capabilities from a language model:
//! summarizing a document and answering a question about it. Both go through
//! [`GenerationClient`], which shapes the prompts and delegates to an
//! [`LlmBackend`]:
//!
//! - [`OpenAiBackend`]: any OpenAI-compatible chat completions API (OpenAI,
//!   Ollama, local servers).
//! - [`MockBackend`]: canned or computed answers for tests and offline runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_llm::{GenerationClient, MockBackend};
//!
//! let client = GenerationClient::new(Arc::new(MockBackend::with_text("A fox.")));
//! let summary = client.summarize("The quick brown fox.").await?;
//! ```

pub mod backend;
pub mod client;
pub mod error;
pub mod openai;
pub mod types;

pub use backend::{LlmBackend, MockBackend, SharedBackend, with_retry};
pub use client::{
    DEFAULT_ANSWER_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SUMMARY_MAX_TOKENS, GenerationClient,
    GenerationConfig, answer_prompt, summarize_prompt,
};
pub use error::{LlmError, Result};
pub use openai::{
    DEFAULT_OLLAMA_BASE, DEFAULT_OPENAI_BASE, OpenAiBackend, OpenAiConfig, create_shared_backend,
};
pub use types::{CompletionRequest, CompletionResponse, StopReason, Usage};
