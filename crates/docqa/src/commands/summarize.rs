//! Summarize command - one-shot extract, summarize and optionally ask.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use docqa_extract::EmptyTextPolicy;
use serde::Serialize;

use super::Context;
use super::extract::read_document;
use crate::generation::{LlmArgs, generation_client};

/// Arguments for the summarize command.
#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// PDF, Word (.docx) or text file
    pub file: PathBuf,

    /// Also answer this question about the document
    #[arg(short, long)]
    pub question: Option<String>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

#[derive(Debug, Serialize)]
struct SummarizeOutput {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
}

/// Run the summarize command.
pub async fn run(args: SummarizeArgs, ctx: &Context) -> Result<()> {
    let llm = args.llm.apply(ctx.config.llm());
    let generator = generation_client(&llm)?;

    let policy = EmptyTextPolicy::from_reject_flag(ctx.config.extraction().reject_empty_text);
    let (format, text) = read_document(args.file.clone(), policy).await?;

    if ctx.verbose {
        eprintln!(
            "Summarizing {} document {} with {} ({})",
            format,
            args.file.display(),
            llm.backend,
            llm.model
        );
    }

    let summary = generator
        .summarize(&text)
        .await
        .context("summarization failed")?;

    let answer = match args.question {
        Some(ref question) => Some(
            generator
                .ask(question, &text)
                .await
                .context("question answering failed")?,
        ),
        None => None,
    };

    if ctx.json_output {
        let output = SummarizeOutput {
            summary,
            question: args.question,
            answer,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", summary);
    if let (Some(question), Some(answer)) = (args.question, answer) {
        println!();
        println!("Q: {}", question);
        println!("A: {}", answer);
    }

    Ok(())
}
