//! Upload, question and reset operations over a client's session.
//!
//! Every operation runs the inactivity gate first. A request that finds its
//! session expired is answered with [`Gated::Expired`] and its payload is
//! dropped without being looked at. Otherwise the operation reads what it
//! needs, calls out to the extractor or the generation backend without
//! holding any lock, and writes its result back in a single store update,
//! so a failure at any step leaves the session as it was.

use chrono::{DateTime, Utc};
use docqa_extract::Extractor;
use docqa_llm::GenerationClient;
use docqa_session::{GateState, QaEntry, SessionId, SessionStore};
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::view::SessionView;

/// Outcome of an operation that passed through the inactivity gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Gated<T> {
    /// The session was live; here is the operation's result.
    Proceed(T),
    /// The session had been idle too long and was cleared. Nothing else ran.
    Expired,
}

impl<T> Gated<T> {
    pub fn is_expired(&self) -> bool {
        matches!(self, Gated::Expired)
    }

    /// The result, if the operation ran.
    pub fn into_inner(self) -> Option<T> {
        match self {
            Gated::Proceed(value) => Some(value),
            Gated::Expired => None,
        }
    }
}

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// The document/QA workflow.
#[derive(Debug, Clone)]
pub struct Workflow {
    store: SessionStore,
    extractor: Extractor,
    generator: GenerationClient,
}

impl Workflow {
    pub fn new(store: SessionStore, extractor: Extractor, generator: GenerationClient) -> Self {
        Self {
            store,
            extractor,
            generator,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn generator(&self) -> &GenerationClient {
        &self.generator
    }

    /// Run the inactivity gate for a request arriving at `now`.
    ///
    /// Every operation below calls this first. The HTTP layer also calls it
    /// before reading a request body, so an expired session is cleared even
    /// when its payload would be rejected.
    pub async fn gate(&self, session_id: &SessionId, now: DateTime<Utc>) -> Gated<()> {
        match self.store.touch(session_id, now).await {
            GateState::Expired => {
                info!(session_id = %session_id, "Session ended due to inactivity");
                Gated::Expired
            }
            GateState::Fresh => {
                debug!(session_id = %session_id, "Session started");
                Gated::Proceed(())
            }
            GateState::Active | GateState::NoticePending => Gated::Proceed(()),
        }
    }

    /// Render the landing view, consuming a pending inactivity notice.
    pub async fn landing(&self, session_id: &SessionId, now: DateTime<Utc>) -> Gated<SessionView> {
        if self.gate(session_id, now).await.is_expired() {
            return Gated::Expired;
        }

        let view = self
            .store
            .update(session_id, |state| {
                let ended = std::mem::take(&mut state.session_ended);
                SessionView::of(state).with_notice(ended)
            })
            .await;
        Gated::Proceed(view)
    }

    /// Extract and summarize an upload, replacing the session's document.
    ///
    /// An unsupported extension fails before the file is staged or the
    /// session is written.
    pub async fn handle_upload(
        &self,
        session_id: &SessionId,
        upload: Upload,
        now: DateTime<Utc>,
    ) -> Result<Gated<SessionView>, WorkflowError> {
        if self.gate(session_id, now).await.is_expired() {
            return Ok(Gated::Expired);
        }

        let document = self
            .extractor
            .extract_upload(&upload.filename, &upload.bytes)
            .await
            .inspect_err(|e| {
                warn!(session_id = %session_id, filename = %upload.filename, error = %e, "Upload rejected");
            })?;

        let summary = self.generator.summarize(&document.text).await?;

        let view = self
            .store
            .update(session_id, |state| {
                state.set_document(document.text, summary);
                state.last_activity = Some(now);
                let ended = std::mem::take(&mut state.session_ended);
                SessionView::of(state).with_notice(ended)
            })
            .await;

        info!(
            session_id = %session_id,
            filename = %upload.filename,
            format = %document.format,
            "Upload accepted"
        );
        Ok(Gated::Proceed(view))
    }

    /// Answer a question against the session's document.
    ///
    /// Before any upload the question is answered against empty context. The
    /// answer is shown but not kept, since history only exists alongside a
    /// document.
    pub async fn handle_question(
        &self,
        session_id: &SessionId,
        question: &str,
        now: DateTime<Utc>,
    ) -> Result<Gated<SessionView>, WorkflowError> {
        if self.gate(session_id, now).await.is_expired() {
            return Ok(Gated::Expired);
        }

        let context = self.store.get(session_id).await.context.unwrap_or_default();
        let answer = self.generator.ask(question, &context).await?;
        let entry = QaEntry::new(question, answer);

        let view = self
            .store
            .update(session_id, |state| {
                if state.has_document() {
                    state.record_answer(entry);
                    SessionView::of(state)
                } else {
                    let mut view = SessionView::of(state);
                    view.qa_history.push(entry);
                    view
                }
            })
            .await;

        debug!(session_id = %session_id, history = view.qa_history.len(), "Question answered");
        Ok(Gated::Proceed(view))
    }

    /// Clear the question/answer history, keeping the document and summary.
    pub async fn handle_reset(&self, session_id: &SessionId, now: DateTime<Utc>) -> Gated<()> {
        if self.gate(session_id, now).await.is_expired() {
            return Gated::Expired;
        }

        self.store
            .update(session_id, |state| state.qa_history.clear())
            .await;
        debug!(session_id = %session_id, "QA history reset");
        Gated::Proceed(())
    }
}
