//! Extract command - prints the text of a document.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use docqa_extract::{DocumentFormat, EmptyTextPolicy, ExtractError};
use serde::Serialize;

use super::Context;

/// Arguments for the extract command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// PDF, Word (.docx) or text file
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ExtractOutput<'a> {
    file: String,
    format: String,
    text: &'a str,
}

/// Run the extract command.
pub async fn run(args: ExtractArgs, ctx: &Context) -> Result<()> {
    let policy = EmptyTextPolicy::from_reject_flag(ctx.config.extraction().reject_empty_text);
    let (format, text) = read_document(args.file.clone(), policy).await?;

    if ctx.json_output {
        let output = ExtractOutput {
            file: args.file.display().to_string(),
            format: format.to_string(),
            text: &text,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if ctx.verbose {
            eprintln!("Extracted {} document: {}", format, args.file.display());
        }
        println!("{}", text);
    }

    Ok(())
}

/// Read and convert a document on the blocking pool.
pub async fn read_document(
    path: PathBuf,
    policy: EmptyTextPolicy,
) -> Result<(DocumentFormat, String)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = DocumentFormat::from_filename(name)?;

    let display = path.display().to_string();
    let text = tokio::task::spawn_blocking(move || docqa_extract::extract_path(&path))
        .await
        .context("extraction task failed")?
        .with_context(|| format!("could not read {}", display))?;

    if policy == EmptyTextPolicy::Reject && text.trim().is_empty() {
        return Err(ExtractError::EmptyText(format).into());
    }

    Ok((format, text))
}
