//! Session cookie and inactivity gate middleware.
//!
//! Every workflow request is tied to a [`SessionId`] carried in an HttpOnly
//! cookie. Requests without a usable cookie get a fresh id, which is set on
//! the response. The gate then runs before any request body is read.

use axum::{
    body::Body,
    Extension,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use docqa_session::SessionId;

use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Cookie Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Find a session id in the request's cookies.
///
/// Malformed values are ignored, as if the cookie were absent.
pub fn session_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == cookie_name)
        .find_map(|(_, value)| value.trim().parse().ok())
}

/// `Set-Cookie` value binding the client to `session_id`.
pub fn session_cookie(cookie_name: &str, session_id: &SessionId) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, session_id)
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Session middleware function.
///
/// Resolves the session id and injects it into request extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let cookie_name = state.config().cookie_name.as_str();
    let existing = session_from_cookies(request.headers(), cookie_name);
    let session_id = existing.unwrap_or_default();

    if existing.is_none() {
        tracing::debug!(session_id = %session_id, "Issuing new session cookie");
    }

    request.extensions_mut().insert(session_id);
    let mut response = next.run(request).await;

    if existing.is_none() {
        match HeaderValue::from_str(&session_cookie(cookie_name, &session_id)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Session cookie is not a valid header value"),
        }
    }

    response
}

/// Inactivity gate middleware.
///
/// Must sit inside [`session_middleware`]. An expired session is cleared and
/// redirected to `/` without its body being parsed or size-checked.
pub async fn gate_middleware(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.workflow().gate(&session_id, Utc::now()).await.is_expired() {
        return Redirect::to("/").into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_finds_named_cookie() {
        let id = SessionId::new();
        let found = session_from_cookies(
            &headers(&format!("theme=dark; docqa_session={}; lang=en", id)),
            "docqa_session",
        );
        assert_eq!(found, Some(id));
    }

    #[test]
    fn test_ignores_missing_and_malformed() {
        assert_eq!(session_from_cookies(&HeaderMap::new(), "docqa_session"), None);
        assert_eq!(
            session_from_cookies(&headers("docqa_session=not-a-uuid"), "docqa_session"),
            None
        );
        assert_eq!(
            session_from_cookies(&headers("other_session=0b5e5c1a-4f0e-4e8b-9a43-1d6f64c1b7a2"), "docqa_session"),
            None
        );
    }

    #[test]
    fn test_cookie_attributes() {
        let id = SessionId::new();
        let cookie = session_cookie("docqa_session", &id);
        assert!(cookie.starts_with(&format!("docqa_session={}", id)));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }
}
