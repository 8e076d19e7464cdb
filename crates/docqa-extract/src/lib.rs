//! Document-to-text extraction for docqa.
//!
//! Uploaded files are normalized into plain text before anything else sees
//! them. The set of supported formats is closed:
//!
//! | Extension | Format | Strategy |
//! |-----------|--------|----------|
//! | `.pdf`  | [`DocumentFormat::Pdf`]  | page text concatenated in page order |
//! | `.docx` | [`DocumentFormat::Word`] | paragraph text joined with `\n` |
//! | `.txt`  | [`DocumentFormat::Text`] | UTF-8 content verbatim |
//!
//! Anything else is rejected with [`ExtractError::UnsupportedFormat`] before
//! any bytes are written or parsed.

mod docx;
pub mod error;
mod extract;
pub mod extractor;
pub mod format;
pub mod staging;

pub use error::{ExtractError, Result};
pub use extract::{extract, extract_path};
pub use extractor::{EmptyTextPolicy, ExtractedDocument, Extractor};
pub use format::DocumentFormat;
pub use staging::{StagedFile, StagingArea};
