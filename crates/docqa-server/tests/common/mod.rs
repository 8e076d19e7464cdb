//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use docqa_extract::{Extractor, StagingArea};
use docqa_llm::{CompletionRequest, GenerationClient, LlmError, MockBackend};
use docqa_server::{Server, ServerConfig, SessionView, Workflow};
use docqa_session::{SessionConfig, SessionStore};

/// Deterministic stand-in for the language model.
///
/// Summaries echo the document in brackets and answers name the question,
/// so tests can tell exactly which text reached the model.
pub fn stub_generation(request: &CompletionRequest) -> docqa_llm::Result<String> {
    if let Some(text) = request.prompt.strip_prefix("summarize: ") {
        Ok(format!("[{}]", text))
    } else if let Some(rest) = request.prompt.strip_prefix("question: ") {
        let question = rest.split(" context: ").next().unwrap_or_default();
        Ok(format!("answer to {}", question))
    } else {
        Err(LlmError::Backend("unexpected prompt".to_string()))
    }
}

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client with its own cookie jar, i.e. its own session.
    pub client: Client,
    /// The mock model behind the server.
    pub backend: Arc<MockBackend>,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
    /// Staging directory for uploads.
    pub temp_dir: TempDir,
}

impl TestServer {
    /// Start a new test server with the default 120 second timeout.
    pub async fn start() -> Result<Self> {
        Self::start_with_timeout(Duration::from_secs(120)).await
    }

    /// Start a new test server with a custom inactivity timeout.
    pub async fn start_with_timeout(session_timeout: Duration) -> Result<Self> {
        Self::start_with(
            MockBackend::with_responder(stub_generation),
            session_timeout,
        )
        .await
    }

    /// Start a new test server around a specific backend.
    pub async fn start_with(backend: MockBackend, session_timeout: Duration) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let backend = Arc::new(backend);

        let workflow = Workflow::new(
            SessionStore::new(SessionConfig::new().with_timeout(session_timeout)),
            Extractor::new(StagingArea::new(temp_dir.path())),
            GenerationClient::new(backend.clone()),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_request_logging(false);
        let server = Server::new(workflow, config)?;

        let handle = tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        let client = new_client()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            backend,
            _handle: handle,
            temp_dir,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Fetch the landing page as JSON.
    pub async fn landing(&self, client: &Client) -> Result<SessionView> {
        let resp = client
            .get(self.url("/"))
            .header("Accept", "application/json")
            .send()
            .await?;
        anyhow::ensure!(resp.status().is_success(), "landing failed: {}", resp.status());
        Ok(resp.json().await?)
    }

    /// Upload a document, returning the raw response.
    pub async fn upload(
        &self,
        client: &Client,
        filename: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<reqwest::Response> {
        let form = Form::new().part("file", Part::bytes(bytes.into()).file_name(filename.to_string()));
        Ok(client
            .post(self.url("/"))
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?)
    }

    /// Ask a question, returning the raw response.
    pub async fn ask(&self, client: &Client, question: &str) -> Result<reqwest::Response> {
        Ok(client
            .post(self.url("/answer"))
            .header("Accept", "application/json")
            .form(&[("question", question)])
            .send()
            .await?)
    }

    /// Reset the question history, following the redirect.
    pub async fn reset(&self, client: &Client) -> Result<reqwest::Response> {
        Ok(client.post(self.url("/reset_qa")).send().await?)
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }
}

/// A client with its own cookie jar.
pub fn new_client() -> Result<Client> {
    Ok(Client::builder().cookie_store(true).build()?)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
