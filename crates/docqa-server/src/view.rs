//! What a client sees of its session, as HTML or JSON.

use axum::{
    Json,
    http::{HeaderMap, header::ACCEPT},
    response::{Html, IntoResponse, Response},
};
use docqa_session::{QaEntry, SessionState};
use minijinja::Environment;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Page title, also the heading of the landing page.
pub const PAGE_TITLE: &str = "Document Summarizer and QA Chatbot";

/// Shown once after a session is cleared for inactivity.
pub const INACTIVITY_NOTICE: &str = "Your session has ended due to inactivity.";

const INDEX_TEMPLATE_NAME: &str = "index.html";

const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1, shrink-to-fit=no">
    <title>{{ title }}</title>
  </head>
  <body>
    <div class="container">
      <h1>{{ title }}</h1>
      {% if session_ended %}
        <div class="alert alert-warning" role="alert">{{ notice }}</div>
      {% endif %}
      <form method="POST" action="/" enctype="multipart/form-data">
        <div class="form-group">
          <label for="file">Upload a PDF, Word, or Text document</label>
          <input type="file" class="form-control" id="file" name="file" accept=".pdf,.docx,.txt">
        </div>
        <button type="submit" class="btn btn-primary">Submit</button>
      </form>
      {% if summary %}
        <h2>Summary</h2>
        <p>{{ summary }}</p>
        <h2>Ask a Question</h2>
        <form method="POST" action="/answer">
          <div class="form-group">
            <label for="question">Question</label>
            <input type="text" class="form-control" id="question" name="question">
          </div>
          <button type="submit" class="btn btn-primary">Ask</button>
        </form>
        {% if qa_history %}
          <h2>Questions and Answers</h2>
          <ul>
            {% for entry in qa_history %}
              <li><strong>Q:</strong> {{ entry.question }}<br><strong>A:</strong> {{ entry.answer }}</li>
            {% endfor %}
          </ul>
          <form method="POST" action="/reset_qa">
            <button type="submit" class="btn btn-danger">Reset QA</button>
          </form>
        {% endif %}
      {% endif %}
    </div>
  </body>
</html>
"#;

/// The parts of a session a response shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    /// Current summary; empty before the first upload.
    pub summary: String,
    /// Questions and answers since the last upload or reset.
    pub qa_history: Vec<QaEntry>,
    /// Whether this response carries the one-time inactivity notice.
    pub session_ended: bool,
}

impl SessionView {
    /// View of a session record, without the inactivity notice.
    pub fn of(state: &SessionState) -> Self {
        Self {
            summary: state.summary_text().to_string(),
            qa_history: state.qa_history.clone(),
            session_ended: false,
        }
    }

    /// Attach the inactivity notice.
    pub fn with_notice(mut self, session_ended: bool) -> Self {
        self.session_ended = session_ended;
        self
    }
}

/// Renders [`SessionView`]s.
#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE_NAME, INDEX_TEMPLATE)
            .map_err(|e| ServerError::Internal(format!("Invalid page template: {}", e)))?;
        Ok(Self { env })
    }

    /// Render the landing page for a view.
    pub fn render_page(&self, view: &SessionView) -> Result<String> {
        let template = self
            .env
            .get_template(INDEX_TEMPLATE_NAME)
            .map_err(|e| ServerError::Internal(format!("Missing page template: {}", e)))?;

        template
            .render(minijinja::context! {
                title => PAGE_TITLE,
                notice => INACTIVITY_NOTICE,
                summary => &view.summary,
                qa_history => &view.qa_history,
                session_ended => view.session_ended,
            })
            .map_err(|e| ServerError::Internal(format!("Failed to render page: {}", e)))
    }

    /// Respond with the view as JSON or as the landing page, per `Accept`.
    pub fn respond(&self, headers: &HeaderMap, view: SessionView) -> Result<Response> {
        if wants_json(headers) {
            return Ok(Json(view).into_response());
        }
        Ok(Html(self.render_page(&view)?).into_response())
    }
}

/// Whether the client asked for JSON.
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn view_with_history() -> SessionView {
        SessionView {
            summary: "A fox jumps.".to_string(),
            qa_history: vec![QaEntry::new("What animal?", "fox")],
            session_ended: false,
        }
    }

    #[test]
    fn test_empty_page_has_upload_form_only() {
        let html = Views::new().unwrap().render_page(&SessionView::default()).unwrap();

        assert!(html.contains("<title>Document Summarizer and QA Chatbot</title>"));
        assert!(html.contains("name=\"file\""));
        assert!(!html.contains("Ask a Question"));
        assert!(!html.contains(INACTIVITY_NOTICE));
    }

    #[test]
    fn test_page_shows_summary_history_and_reset() {
        let html = Views::new().unwrap().render_page(&view_with_history()).unwrap();

        assert!(html.contains("A fox jumps."));
        assert!(html.contains("What animal?"));
        assert!(html.contains("Reset QA"));
    }

    #[test]
    fn test_reset_button_hidden_without_history() {
        let mut view = view_with_history();
        view.qa_history.clear();

        let html = Views::new().unwrap().render_page(&view).unwrap();
        assert!(html.contains("Ask a Question"));
        assert!(!html.contains("Reset QA"));
    }

    #[test]
    fn test_notice_rendered_when_flagged() {
        let view = SessionView::default().with_notice(true);
        let html = Views::new().unwrap().render_page(&view).unwrap();
        assert!(html.contains(INACTIVITY_NOTICE));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let view = SessionView {
            summary: "<script>alert(1)</script>".to_string(),
            ..Default::default()
        };

        let html = Views::new().unwrap().render_page(&view).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        assert!(!wants_json(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain"));
        assert!(wants_json(&headers));
    }

    #[test]
    fn test_view_of_state() {
        let mut state = SessionState::default();
        state.set_document("The quick brown fox.".to_string(), "A fox.".to_string());
        state.record_answer(QaEntry::new("q", "a"));

        let view = SessionView::of(&state);
        assert_eq!(view.summary, "A fox.");
        assert_eq!(view.qa_history.len(), 1);
        assert!(!view.session_ended);
    }
}
