//! Per-client session state for docqa.
//!
//! This crate holds everything the workflow remembers about one client:
//! - the extracted document text (the *context*) and its summary
//! - an append-only question/answer history
//! - the inactivity timeout gate that invalidates idle sessions
//!
//! Records live in memory only, bounded by an LRU capacity. Nothing here
//! survives a process restart.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_session::{SessionConfig, SessionId, SessionStore};
//!
//! let store = SessionStore::new(SessionConfig::default());
//! let id = SessionId::new();
//!
//! if store.touch(&id, chrono::Utc::now()).await.is_expired() {
//!     // redirect to the landing page
//! }
//! ```

mod config;
mod error;
mod gate;
mod state;
mod store;

pub use config::{DEFAULT_MAX_SESSIONS, DEFAULT_TIMEOUT, SessionConfig};
pub use error::{Error, Result};
pub use gate::{GateState, TimeoutGate};
pub use state::{QaEntry, SessionId, SessionState};
pub use store::SessionStore;
