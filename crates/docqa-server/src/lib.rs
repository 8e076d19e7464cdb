//! HTTP server for docqa.
//!
//! Serves the document summarizer and QA workflow:
//!
//! - `GET /` renders the landing page and shows the one-time inactivity
//!   notice after a session timed out.
//! - `POST /` uploads a document (multipart field `file`), extracts its text
//!   and summarizes it.
//! - `POST /answer` answers the form field `question` against the document.
//! - `POST /reset_qa` clears the question history and redirects to `/`.
//! - `GET /health` reports liveness.
//!
//! Workflow routes are bound to a session cookie and pass through the
//! inactivity gate. Responses are HTML unless the client sends
//! `Accept: application/json`.
//!
//! # Example
//!
//! ```ignore
//! use docqa_server::{Server, ServerConfig, Workflow};
//!
//! let workflow = Workflow::new(store, extractor, generator);
//! let server = Server::new(workflow, ServerConfig::default())?;
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod session;
pub mod state;
pub mod view;
pub mod workflow;

pub use config::ServerConfig;
pub use error::{
    GENERATION_FAILED_MESSAGE, Result, ServerError, UNSUPPORTED_FORMAT_MESSAGE, WorkflowError,
};
pub use logging::request_logging_middleware;
pub use routes::{HealthResponse, QuestionForm};
pub use session::{gate_middleware, session_cookie, session_from_cookies, session_middleware};
pub use state::AppState;
pub use view::{INACTIVITY_NOTICE, PAGE_TITLE, SessionView, Views};
pub use workflow::{Gated, Upload, Workflow};

use std::net::SocketAddr;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

/// The docqa HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server for the given workflow and configuration.
    pub fn new(workflow: Workflow, config: ServerConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(workflow, config)?,
        })
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            // Health routes (no session, never gated)
            .merge(routes::health_routes())
            .merge(self.workflow_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Session-bound workflow routes.
    ///
    /// Layers run outermost first: session cookie, inactivity gate, then the
    /// body size limit.
    fn workflow_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        Router::new()
            .route(
                "/",
                get(routes::index_handler).post(routes::upload_handler),
            )
            .route("/answer", post(routes::answer_handler))
            .route("/reset_qa", post(routes::reset_handler))
            .route_layer(DefaultBodyLimit::disable())
            .route_layer(RequestBodyLimitLayer::new(self.state.config.max_body_size))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                session::gate_middleware,
            ))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                session::session_middleware,
            ))
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let router = self.router();

        match listener.local_addr() {
            Ok(addr) => info!("Starting server on {}", addr),
            Err(_) => info!("Starting server"),
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
