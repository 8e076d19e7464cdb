//! Word (`.docx`) paragraph extraction.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! Only paragraphs sitting directly in `w:body` are read, so table cells and
//! text boxes contribute nothing. Paragraph text is the concatenation of its
//! `w:t` runs, with run-level `w:tab` and `w:br` mapped to `\t` and `\n`.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

use crate::error::{ExtractError, Result};
use crate::format::DocumentFormat;

const DOCUMENT_PART: &str = "word/document.xml";

pub(crate) fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(word_error)?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(word_error)?
        .read_to_string(&mut xml)
        .map_err(word_error)?;

    Ok(paragraphs(&xml)?.join("\n"))
}

fn paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut done = Vec::new();
    // Local names of the open elements, outermost first.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    // The body-level paragraph being read.
    let mut current: Option<String> = None;
    // Paragraphs open inside `current` (text boxes); their text is skipped.
    let mut nested = 0usize;

    loop {
        match reader.read_event().map_err(word_error)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" {
                    if current.is_some() {
                        nested += 1;
                    } else if parent_is(&stack, b"body") {
                        current = Some(String::new());
                    }
                }
                stack.push(name);
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" if current.is_none() && parent_is(&stack, b"body") => {
                    done.push(String::new())
                }
                b"tab" if parent_is(&stack, b"r") && nested == 0 => push(&mut current, "\t"),
                b"br" | b"cr" if parent_is(&stack, b"r") && nested == 0 => {
                    push(&mut current, "\n")
                }
                _ => {}
            },
            Event::Text(t) if parent_is(&stack, b"t") && nested == 0 => {
                let text = t.decode().map_err(word_error)?;
                push(&mut current, &text);
            }
            Event::GeneralRef(r) if parent_is(&stack, b"t") && nested == 0 => {
                if let Some(ch) = r.resolve_char_ref().map_err(word_error)? {
                    push(&mut current, ch.encode_utf8(&mut [0u8; 4]));
                } else {
                    let name = r.decode().map_err(word_error)?;
                    let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
                        ExtractError::extraction(
                            DocumentFormat::Word,
                            format!("unknown entity &{};", name),
                        )
                    })?;
                    push(&mut current, resolved);
                }
            }
            Event::End(e) => {
                stack.pop();
                if e.local_name().as_ref() == b"p" {
                    if nested > 0 {
                        nested -= 1;
                    } else if parent_is(&stack, b"body")
                        && let Some(paragraph) = current.take()
                    {
                        done.push(paragraph);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(done)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|top| top.as_slice() == name)
}

fn push(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}

fn word_error(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::extraction(DocumentFormat::Word, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn build_docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in parts {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = document(body);
        build_docx(&[("[Content_Types].xml", "<Types/>"), (DOCUMENT_PART, &xml)])
    }

    #[test]
    fn test_paragraphs_joined_with_newline() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>The quick</w:t></w:r><w:r><w:t xml:space=\"preserve\"> brown fox.</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>",
        );

        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text, "The quick brown fox.\nSecond paragraph");
    }

    #[test]
    fn test_empty_paragraphs_are_kept() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Before</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>After</w:t></w:r></w:p>",
        );

        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text, "Before\n\n\nAfter");
    }

    #[test]
    fn test_entities_are_resolved() {
        let bytes = docx_with_body("<w:p><w:r><w:t>Fish &amp; Chips &#169;</w:t></w:r></w:p>");

        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text, "Fish & Chips \u{a9}");
    }

    #[test]
    fn test_run_tabs_and_breaks() {
        let bytes = docx_with_body(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>",
        );

        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text, "a\tb\nc");
    }

    #[test]
    fn test_only_body_paragraphs_are_read() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Intro</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>Outro</w:t></w:r>\
             <w:r><w:pict><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></w:pict></w:r></w:p>",
        );

        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text, "Intro\nOutro");
    }

    #[test]
    fn test_missing_document_part_fails() {
        let bytes = build_docx(&[("word/styles.xml", "<w:styles/>")]);

        let err = extract_docx(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Extraction {
                format: DocumentFormat::Word,
                ..
            }
        ));
    }

    #[test]
    fn test_not_a_zip_fails() {
        let err = extract_docx(b"plain bytes, no archive").unwrap_err();
        assert!(matches!(err, ExtractError::Extraction { .. }));
    }
}
