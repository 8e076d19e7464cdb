//! Configuration for the session store.

use std::time::Duration;

/// Default maximum number of live session records.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default inactivity timeout (two minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of session records kept before LRU eviction.
    pub max_sessions: usize,

    /// Idle time after which a session is invalidated on its next request.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of session records.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the inactivity timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
