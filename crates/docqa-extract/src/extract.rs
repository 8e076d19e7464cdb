//! Per-format text extraction.

use std::path::Path;

use tracing::debug;

use crate::docx;
use crate::error::{ExtractError, Result};
use crate::format::DocumentFormat;

/// Extract plain text from the raw bytes of a document of the given format.
pub fn extract(bytes: &[u8], format: DocumentFormat) -> Result<String> {
    let text = match format {
        DocumentFormat::Pdf => extract_pdf(bytes)?,
        DocumentFormat::Word => docx::extract_docx(bytes)?,
        DocumentFormat::Text => extract_text(bytes)?,
    };

    debug!(
        format = %format,
        bytes = bytes.len(),
        chars = text.chars().count(),
        "Extracted document text"
    );

    Ok(text)
}

/// Read a file from disk and extract its text, picking the format from its
/// extension.
pub fn extract_path(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = DocumentFormat::from_filename(name)?;
    let bytes = std::fs::read(path)?;
    extract(&bytes, format)
}

/// Pages are concatenated in document order; a page without a text layer
/// contributes nothing.
fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::extraction(DocumentFormat::Pdf, e))?;
    Ok(pages.concat())
}

fn extract_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::extraction(DocumentFormat::Text, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_text_is_verbatim() {
        let text = extract(b"The quick brown fox.", DocumentFormat::Text).unwrap();
        assert_eq!(text, "The quick brown fox.");
    }

    #[test]
    fn test_text_keeps_whitespace_and_unicode() {
        let input = "  line one\r\nline two \u{00e9}\n\n";
        let text = extract(input.as_bytes(), DocumentFormat::Text).unwrap();
        assert_eq!(text, input);
    }

    #[test]
    fn test_text_invalid_utf8_fails() {
        let err = extract(&[0xff, 0xfe, 0x00, 0x61], DocumentFormat::Text).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Extraction {
                format: DocumentFormat::Text,
                ..
            }
        ));
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let bytes = build_pdf(&["Alpha", "Omega"]);
        let text = extract(&bytes, DocumentFormat::Pdf).unwrap();

        let alpha = text.find("Alpha").expect("first page text");
        let omega = text.find("Omega").expect("second page text");
        assert!(alpha < omega);
    }

    #[test]
    fn test_pdf_garbage_fails() {
        let err = extract(b"definitely not a pdf", DocumentFormat::Pdf).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Extraction {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }

    #[test]
    fn test_extract_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fox.txt");
        std::fs::write(&path, "The quick brown fox.").unwrap();

        assert_eq!(extract_path(&path).unwrap(), "The quick brown fox.");
    }

    #[test]
    fn test_extract_path_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fox.rtf");
        std::fs::write(&path, "{\\rtf1}").unwrap();

        assert!(extract_path(&path).unwrap_err().is_unsupported_format());
    }
}
