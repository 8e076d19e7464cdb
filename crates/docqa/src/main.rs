//! docqa - Document Summarizer and QA Chatbot
//!
//! Main entry point for the docqa CLI.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;
mod generation;

use commands::{extract, start, summarize};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// docqa - Document Summarizer and QA Chatbot
#[derive(Parser)]
#[command(name = "docqa")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long, global = true, env = "DOCQA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Start(start::StartArgs),

    /// Print the text extracted from a document
    Extract(extract::ExtractArgs),

    /// Summarize a document, optionally answering a question about it
    Summarize(summarize::SummarizeArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref())?;
    let _guard = init_tracing(cli.verbose, &loaded.config.logging());

    // Print warnings (parse errors in skipped layers)
    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if cli.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            eprintln!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                eprintln!("Loaded config: {}", source.display());
            }
        }
    }

    let ctx = commands::Context {
        config: loaded.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Extract(args) => extract::run(args, &ctx).await,
        Commands::Summarize(args) => summarize::run(args, &ctx).await,
    }
}

fn load_config(explicit: Option<&Path>) -> Result<docqa_config::LoadedConfig> {
    let Some(path) = explicit else {
        return Ok(docqa_config::load_config(None)?);
    };

    let config = docqa_config::load_config_file(path)?;
    Ok(docqa_config::LoadedConfig {
        config,
        sources: vec![docqa_config::ConfigSource {
            path: path.to_path_buf(),
            loaded: true,
        }],
        warnings: Vec::new(),
    })
}

/// Console (human-readable) + daily rotating JSON file.
fn init_tracing(verbose: bool, logging: &docqa_config::LoggingConfig) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let filter = if verbose {
        "docqa=debug,docqa_server=debug,docqa_session=debug,docqa_extract=debug,docqa_llm=debug,docqa_config=debug,info"
    } else {
        "docqa=info,docqa_server=info,docqa_session=info,docqa_extract=info,docqa_llm=info,warn"
    };

    let (file_layer, guard) = if logging.file {
        let log_dir = logging
            .dir
            .clone()
            .or_else(|| docqa_config::xdg_config_dir().map(|d| d.join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "docqa.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(tracing_subscriber::EnvFilter::new(
                "docqa=trace,docqa_server=trace,docqa_session=trace,docqa_extract=trace,docqa_llm=trace,docqa_config=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer)
        .init();

    guard
}
