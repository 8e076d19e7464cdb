//! Builds the generation client from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use docqa_config::{Backend, LlmConfig};
use docqa_llm::{
    CompletionRequest, GenerationClient, GenerationConfig, MockBackend, OpenAiConfig,
    SharedBackend, create_shared_backend,
};

/// Generation backend flags shared by the commands that talk to a model.
///
/// Each flag overrides the `[llm]` section of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct LlmArgs {
    /// LLM backend: openai, ollama or mock (overrides config)
    #[arg(long)]
    pub backend: Option<Backend>,

    /// Model (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Custom base URL (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,
}

impl LlmArgs {
    /// Apply the flags on top of the configured values.
    pub fn apply(&self, mut llm: LlmConfig) -> LlmConfig {
        if let Some(backend) = self.backend {
            llm.backend = backend;
        }
        if let Some(ref model) = self.model {
            llm.model = model.clone();
        }
        if let Some(ref base_url) = self.base_url {
            llm.base_url = Some(base_url.clone());
        }
        llm
    }
}

/// Construct the backend once and wrap it in a [`GenerationClient`].
pub fn generation_client(llm: &LlmConfig) -> Result<GenerationClient> {
    let backend = shared_backend(llm)?;

    let mut config = GenerationConfig::default()
        .with_model(&llm.model)
        .with_summary_max_tokens(llm.summary_max_tokens)
        .with_answer_max_tokens(llm.answer_max_tokens);
    if let Some(temperature) = llm.temperature {
        config = config.with_temperature(temperature);
    }

    Ok(GenerationClient::new(backend).with_config(config))
}

fn shared_backend(llm: &LlmConfig) -> Result<SharedBackend> {
    let base = match llm.backend {
        Backend::Mock => {
            return Ok(Arc::new(MockBackend::with_responder(offline_generation)));
        }
        Backend::Openai => {
            let var = llm
                .resolved_api_key_env()
                .unwrap_or_else(|| "OPENAI_API_KEY".to_string());
            OpenAiConfig::openai_from_env_var(&var)
                .with_context(|| format!("{} backend needs an API key", llm.backend))?
        }
        Backend::Ollama => OpenAiConfig::ollama(),
    };

    let mut config = base
        .with_model(&llm.model)
        .with_timeout(Duration::from_secs(llm.timeout_secs))
        .with_max_retries(llm.max_retries);
    if let Some(ref url) = llm.base_url {
        config = config.with_base_url(url);
    }

    Ok(create_shared_backend(config)?)
}

/// Stand-in model for `--backend mock`: the summary is the opening words of
/// the document and answers point at the summary.
fn offline_generation(request: &CompletionRequest) -> docqa_llm::Result<String> {
    if let Some(text) = request.prompt.strip_prefix("summarize: ") {
        let words: Vec<&str> = text
            .split_whitespace()
            .take(request.max_tokens as usize)
            .collect();
        return Ok(words.join(" "));
    }
    Ok("No model is configured; see the summary above.".to_string())
}
