//! Inactivity timeout evaluation.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Outcome of running a session through the timeout gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No activity had been recorded yet.
    Fresh,
    /// Activity within the timeout; the request proceeds.
    Active,
    /// Idle past the timeout; the session has been cleared.
    Expired,
    /// A previous expiry is still waiting for the landing page to report it.
    NoticePending,
}

impl GateState {
    /// Whether the gate invalidated the session on this request.
    pub fn is_expired(&self) -> bool {
        matches!(self, GateState::Expired)
    }
}

/// Decides whether a session has been idle for too long.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGate {
    timeout: TimeDelta,
}

impl TimeoutGate {
    /// Create a gate with the given inactivity timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX),
        }
    }

    /// The configured inactivity timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout.to_std().unwrap_or(Duration::MAX)
    }

    /// Classify a session given its last recorded activity.
    ///
    /// Expiry is strict: an idle time exactly equal to the timeout still
    /// counts as active.
    pub fn evaluate(&self, last_activity: Option<DateTime<Utc>>, now: DateTime<Utc>) -> GateState {
        match last_activity {
            None => GateState::Fresh,
            Some(last) if self.is_expired(last, now) => GateState::Expired,
            Some(_) => GateState::Active,
        }
    }

    /// Check if activity at `last_activity` is stale at `now`.
    pub fn is_expired(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last_activity) > self.timeout
    }
}
