//! Supported document formats.

use std::path::Path;

use crate::error::{ExtractError, Result};

/// A document format the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Portable Document Format (`.pdf`).
    Pdf,
    /// Office Open XML word processing document (`.docx`).
    Word,
    /// UTF-8 plain text (`.txt`).
    Text,
}

impl DocumentFormat {
    /// Select a format from a bare extension such as `"pdf"` or `".DOCX"`.
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Word),
            "txt" => Ok(DocumentFormat::Text),
            _ => Err(ExtractError::UnsupportedFormat(ext)),
        }
    }

    /// Select a format from the final extension of a file name.
    pub fn from_filename(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    /// Canonical extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Word => "docx",
            DocumentFormat::Text => "txt",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Word => "Word",
            DocumentFormat::Text => "text",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension(".docx").unwrap(), DocumentFormat::Word);
        assert_eq!(DocumentFormat::from_extension("TXT").unwrap(), DocumentFormat::Text);
    }

    #[test]
    fn test_from_filename_uses_final_extension() {
        assert_eq!(
            DocumentFormat::from_filename("report.final.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_filename("notes.txt").unwrap(),
            DocumentFormat::Text
        );
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["slides.pptx", "legacy.doc", "image.png", "README", "archive.txt.zip"] {
            let err = DocumentFormat::from_filename(name).unwrap_err();
            assert!(err.is_unsupported_format(), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_extension_roundtrip() {
        for format in [DocumentFormat::Pdf, DocumentFormat::Word, DocumentFormat::Text] {
            assert_eq!(DocumentFormat::from_extension(format.extension()).unwrap(), format);
        }
    }
}
