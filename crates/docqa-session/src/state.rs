//! The per-session state record.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Opaque identifier for a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::InvalidId(s.to_string()))
    }
}

/// One question and the answer generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

impl QaEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Everything remembered about one client.
///
/// `context` and `summary` are written together by an upload and are `None`
/// until the first successful one. `qa_history` is chronological and only
/// ever shrinks by being reset to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Full text extracted from the uploaded document.
    pub context: Option<String>,

    /// Summary of `context`.
    pub summary: Option<String>,

    /// Questions and answers since the last upload or reset.
    pub qa_history: Vec<QaEntry>,

    /// Time of the last request that passed the timeout gate.
    pub last_activity: Option<DateTime<Utc>>,

    /// One-shot marker left behind by a timeout invalidation.
    pub session_ended: bool,
}

impl SessionState {
    /// An empty record with the inactivity marker set.
    pub fn expired() -> Self {
        Self {
            session_ended: true,
            ..Self::default()
        }
    }

    /// Whether a document has been uploaded into this session.
    pub fn has_document(&self) -> bool {
        self.context.is_some()
    }

    /// Replace the document, dropping any history tied to the previous one.
    pub fn set_document(&mut self, context: String, summary: String) {
        self.context = Some(context);
        self.summary = Some(summary);
        self.qa_history.clear();
    }

    /// Append a question/answer pair to the history.
    pub fn record_answer(&mut self, entry: QaEntry) {
        self.qa_history.push(entry);
    }

    /// Context text, or the empty string before any upload.
    pub fn context_text(&self) -> &str {
        self.context.as_deref().unwrap_or_default()
    }

    /// Summary text, or the empty string before any upload.
    pub fn summary_text(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }
}
