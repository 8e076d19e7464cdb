//! Start command - launches the docqa web server.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use docqa_config::DocqaConfig;
use docqa_extract::{EmptyTextPolicy, Extractor, StagingArea};
use docqa_server::{Server, ServerConfig, Workflow};
use docqa_session::{SessionConfig, SessionStore};
use tracing::{info, warn};

use super::Context;
use crate::generation::{LlmArgs, generation_client};

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Inactivity timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory for staged uploads (overrides config)
    #[arg(long)]
    pub staging_dir: Option<std::path::PathBuf>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

impl StartArgs {
    /// Fold the flags into a copy of the loaded configuration.
    fn apply(&self, config: &DocqaConfig) -> DocqaConfig {
        let mut config = config.clone();

        let mut server = config.server();
        if let Some(port) = self.port {
            server.port = port;
        }
        if let Some(ref bind) = self.bind {
            server.bind = bind.clone();
        }
        if let Some(ref dir) = self.staging_dir {
            server.staging_dir = Some(dir.clone());
        }
        config.server = Some(server);

        if let Some(secs) = self.timeout_secs {
            let mut session = config.session();
            session.timeout_secs = secs;
            config.session = Some(session);
        }

        config.llm = Some(self.llm.apply(config.llm()));
        config
    }
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let config = args.apply(&ctx.config);
    config.validate()?;

    let server = config.server();
    let session = config.session();
    let llm = config.llm();

    let ip: IpAddr = server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", server.bind))?;
    let addr = SocketAddr::new(ip, server.port);

    // ── Generation backend ──────────────────────────────────────────────

    if ctx.verbose {
        println!("Backend: {}", llm.backend);
        println!("Model: {}", llm.model);
    }

    let generator = generation_client(&llm)?;
    match generator.health_check().await {
        Ok(()) => info!(backend = %llm.backend, model = %llm.model, "Generation backend ready"),
        Err(e) => warn!(
            backend = %llm.backend,
            error = %e,
            "Generation backend health check failed; requests may fail"
        ),
    }

    // ── Workflow ────────────────────────────────────────────────────────

    let staging = server
        .staging_dir
        .clone()
        .map(StagingArea::new)
        .unwrap_or_else(StagingArea::in_temp_dir);
    let extractor = Extractor::new(staging).with_empty_text_policy(
        EmptyTextPolicy::from_reject_flag(config.extraction().reject_empty_text),
    );

    let store = SessionStore::new(
        SessionConfig::new()
            .with_timeout(Duration::from_secs(session.timeout_secs))
            .with_max_sessions(session.max_sessions),
    );

    info!(
        timeout_secs = session.timeout_secs,
        max_sessions = session.max_sessions,
        staging_dir = %extractor.staging().dir().display(),
        "Session store configured"
    );

    let workflow = Workflow::new(store, extractor, generator);

    // ── Server ──────────────────────────────────────────────────────────

    let server_config = ServerConfig::new()
        .with_bind_address(addr)
        .with_request_logging(server.request_logging)
        .with_max_body_size(server.max_upload_bytes)
        .with_cookie_name(session.cookie_name);

    let server = Server::new(workflow, server_config)?;
    println!("docqa listening on http://{}", server.bind_address());
    server.run().await?;

    Ok(())
}
