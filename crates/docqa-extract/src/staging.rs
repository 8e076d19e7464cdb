//! Working directory for uploads awaiting extraction.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;

/// Directory where uploads are written before extraction.
///
/// Every staged file gets a UUID prefix, so concurrent uploads with the same
/// file name never share a path.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Use `dir` as the staging directory. It is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A staging area under the system temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("docqa-staging"))
    }

    /// The staging directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an upload to a fresh path inside the staging directory.
    pub async fn stage(&self, filename: &str, bytes: &[u8]) -> Result<StagedFile> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self
            .dir
            .join(format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename)));
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), bytes = bytes.len(), "Staged upload");
        Ok(StagedFile { path })
    }
}

/// An upload written to disk. The file is removed when this is dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Location of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload");
        }
    }
}

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]`.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\report.pdf"), "report.pdf");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my report (v2).docx"), "my_report__v2_.docx");
    }

    #[test]
    fn test_sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
    }

    #[tokio::test]
    async fn test_stage_writes_and_drop_removes() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path().join("staging"));

        let staged = area.stage("notes.txt", b"hello").await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.starts_with(area.dir()));
        assert!(path.to_string_lossy().ends_with("-notes.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_name_gets_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path());

        let a = area.stage("same.txt", b"a").await.unwrap();
        let b = area.stage("same.txt", b"b").await.unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read(a.path()).unwrap(), b"a");
        assert_eq!(std::fs::read(b.path()).unwrap(), b"b");
    }
}
