//! Upload extraction pipeline: format check, staging, conversion.

use tracing::{info, warn};

use crate::error::{ExtractError, Result};
use crate::extract::extract;
use crate::format::DocumentFormat;
use crate::staging::StagingArea;

/// What to do when a supported document yields no text at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyTextPolicy {
    /// Accept the empty string as the document's text.
    #[default]
    Allow,
    /// Fail with [`ExtractError::EmptyText`].
    Reject,
}

impl EmptyTextPolicy {
    pub fn from_reject_flag(reject: bool) -> Self {
        if reject {
            EmptyTextPolicy::Reject
        } else {
            EmptyTextPolicy::Allow
        }
    }
}

/// Text extracted from an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub text: String,
    pub format: DocumentFormat,
}

/// Turns uploaded files into text.
#[derive(Debug, Clone)]
pub struct Extractor {
    staging: StagingArea,
    empty_text: EmptyTextPolicy,
}

impl Extractor {
    pub fn new(staging: StagingArea) -> Self {
        Self {
            staging,
            empty_text: EmptyTextPolicy::default(),
        }
    }

    /// Set the empty-text policy.
    pub fn with_empty_text_policy(mut self, policy: EmptyTextPolicy) -> Self {
        self.empty_text = policy;
        self
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn empty_text_policy(&self) -> EmptyTextPolicy {
        self.empty_text
    }

    /// Extract the text of an uploaded file.
    ///
    /// The format comes from the file name's extension and is checked before
    /// anything touches the disk. Supported uploads are staged, converted on
    /// the blocking pool, and unstaged again whatever the outcome.
    pub async fn extract_upload(&self, filename: &str, bytes: &[u8]) -> Result<ExtractedDocument> {
        let format = DocumentFormat::from_filename(filename)?;
        let staged = self.staging.stage(filename, bytes).await?;

        let path = staged.path().to_path_buf();
        let joined = tokio::task::spawn_blocking(move || {
            let bytes = std::fs::read(&path)?;
            extract(&bytes, format)
        })
        .await;
        drop(staged);

        let text = match joined {
            Ok(result) => result?,
            Err(e) if e.is_panic() => {
                warn!(filename, format = %format, "Document converter panicked");
                return Err(ExtractError::extraction(format, "converter crashed on this file"));
            }
            Err(e) => return Err(ExtractError::extraction(format, e)),
        };

        if text.trim().is_empty() && self.empty_text == EmptyTextPolicy::Reject {
            return Err(ExtractError::EmptyText(format));
        }

        info!(
            filename,
            format = %format,
            chars = text.chars().count(),
            "Upload extracted"
        );

        Ok(ExtractedDocument { text, format })
    }
}
