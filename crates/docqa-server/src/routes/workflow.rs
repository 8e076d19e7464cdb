//! Landing page, upload, question and reset endpoints.

use axum::{
    Extension, Form,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::FormRejection,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use docqa_session::SessionId;
use serde::Deserialize;

use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::view::SessionView;
use crate::workflow::{Gated, Upload};

/// Multipart field carrying the uploaded document.
pub const UPLOAD_FIELD: &str = "file";

/// Form body of a question.
#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    pub question: String,
}

/// `GET /`
pub async fn index_handler(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    headers: HeaderMap,
) -> Result<Response> {
    let outcome = state.workflow().landing(&session_id, Utc::now()).await;
    respond(&state, &headers, outcome)
}

/// `POST /` with a multipart `file` field.
///
/// A form submitted without choosing a file just shows the page again.
pub async fn upload_handler(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let multipart = multipart.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let upload = read_upload(multipart)
        .await?
        .ok_or_else(|| ServerError::BadRequest(format!("missing '{}' field", UPLOAD_FIELD)))?;

    let now = Utc::now();
    let workflow = state.workflow();
    let outcome = if upload.filename.is_empty() {
        workflow.landing(&session_id, now).await
    } else {
        workflow.handle_upload(&session_id, upload, now).await?
    };

    respond(&state, &headers, outcome)
}

/// `POST /answer` with a form field `question`.
pub async fn answer_handler(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    headers: HeaderMap,
    form: std::result::Result<Form<QuestionForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let outcome = state
        .workflow()
        .handle_question(&session_id, &form.question, Utc::now())
        .await?;

    respond(&state, &headers, outcome)
}

/// `POST /reset_qa`
pub async fn reset_handler(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Redirect {
    // Expired or not, the client goes back to the landing page.
    let _ = state.workflow().handle_reset(&session_id, Utc::now()).await;
    Redirect::to("/")
}

/// Render a gated outcome, sending expired sessions to the landing page.
fn respond(state: &AppState, headers: &HeaderMap, outcome: Gated<SessionView>) -> Result<Response> {
    match outcome {
        Gated::Proceed(view) => state.views().respond(headers, view),
        Gated::Expired => Ok(Redirect::to("/").into_response()),
    }
}

/// Pull the uploaded file out of a multipart body. Other fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(Upload::new(filename, bytes.to_vec())));
    }
    Ok(None)
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(e.body_text())
    }
}
