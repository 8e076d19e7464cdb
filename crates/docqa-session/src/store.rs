//! In-memory session store with LRU bounding and the timeout gate.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::config::SessionConfig;
use crate::gate::{GateState, TimeoutGate};
use crate::state::{SessionId, SessionState};

/// Session store keyed by [`SessionId`].
///
/// Every operation takes the lock once, so a write never exposes a half
/// updated record to a concurrent read of the same session. Records of
/// different sessions never alias.
///
/// Cloning is cheap and shares the underlying records.
pub struct SessionStore {
    inner: Arc<RwLock<LruCache<SessionId, SessionState>>>,
    gate: TimeoutGate,
    config: SessionConfig,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new(config: SessionConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);

        Self {
            inner: Arc::new(RwLock::new(LruCache::new(cap))),
            gate: TimeoutGate::new(config.timeout),
            config,
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the timeout gate used by [`touch`](Self::touch).
    pub fn gate(&self) -> &TimeoutGate {
        &self.gate
    }

    /// Number of live session records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if no session has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Current record for a session, or an empty one on first touch.
    ///
    /// Does not affect LRU order.
    pub async fn get(&self, session_id: &SessionId) -> SessionState {
        self.inner
            .read()
            .await
            .peek(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrite a session record.
    pub async fn put(&self, session_id: &SessionId, state: SessionState) {
        let mut lru = self.inner.write().await;
        log_eviction(&lru, session_id);
        lru.put(*session_id, state);
        trace!(session_id = %session_id, cache_size = lru.len(), "Session record stored");
    }

    /// Apply a partial update to a session record in one critical section.
    ///
    /// The record is created empty if it does not exist yet.
    pub async fn update<F, R>(&self, session_id: &SessionId, f: F) -> R
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut lru = self.inner.write().await;
        log_eviction(&lru, session_id);
        let state = lru.get_or_insert_mut(*session_id, SessionState::default);
        f(state)
    }

    /// Run the timeout gate for a request arriving at `now`.
    ///
    /// Fresh and active sessions have their activity time moved to `now`.
    /// An expired session is cleared and left with the inactivity marker set.
    /// A session whose marker is still set is passed through untouched.
    pub async fn touch(&self, session_id: &SessionId, now: DateTime<Utc>) -> GateState {
        let gate = self.gate;
        self.update(session_id, |state| {
            if state.session_ended {
                return GateState::NoticePending;
            }

            let outcome = gate.evaluate(state.last_activity, now);
            match outcome {
                GateState::Fresh | GateState::Active => {
                    state.last_activity = Some(now);
                }
                GateState::Expired => {
                    debug!(session_id = %session_id, "Session idle past timeout, clearing");
                    *state = SessionState::expired();
                }
                GateState::NoticePending => {}
            }
            outcome
        })
        .await
    }

    /// Reset every field of a session to its default.
    pub async fn clear(&self, session_id: &SessionId) {
        let mut lru = self.inner.write().await;
        if let Some(state) = lru.get_mut(session_id) {
            *state = SessionState::default();
        }
    }

    /// Read and clear the inactivity marker.
    pub async fn take_session_ended(&self, session_id: &SessionId) -> bool {
        let mut lru = self.inner.write().await;
        match lru.get_mut(session_id) {
            Some(state) => std::mem::take(&mut state.session_ended),
            None => false,
        }
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gate: self.gate,
            config: self.config.clone(),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("gate", &self.gate)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn log_eviction(lru: &LruCache<SessionId, SessionState>, incoming: &SessionId) {
    if lru.contains(incoming) || lru.len() < lru.cap().get() {
        return;
    }
    if let Some((evicted, _)) = lru.peek_lru() {
        debug!(session_id = %evicted, "Evicting least recently used session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::QaEntry;
    use chrono::TimeDelta;
    use std::time::Duration;

    fn store() -> SessionStore {
        SessionStore::new(SessionConfig::new().with_timeout(Duration::from_secs(120)))
    }

    fn with_document(context: &str) -> SessionState {
        let mut state = SessionState::default();
        state.set_document(context.to_string(), format!("summary of {}", context));
        state
    }

    #[tokio::test]
    async fn test_get_unknown_session_is_empty() {
        let store = store();
        let state = store.get(&SessionId::new()).await;
        assert_eq!(state, SessionState::default());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = store();
        let id = SessionId::new();

        store.put(&id, with_document("doc")).await;

        let state = store.get(&id).await;
        assert_eq!(state.context.as_deref(), Some("doc"));
        assert_eq!(state.summary.as_deref(), Some("summary of doc"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = store();
        let a = SessionId::new();
        let b = SessionId::new();

        store.put(&a, with_document("alpha")).await;
        store.put(&b, with_document("beta")).await;
        store.clear(&a).await;

        assert_eq!(store.get(&a).await, SessionState::default());
        assert_eq!(store.get(&b).await.context.as_deref(), Some("beta"));
    }

    #[tokio::test]
    async fn test_update_creates_record() {
        let store = store();
        let id = SessionId::new();

        let len = store
            .update(&id, |state| {
                state.record_answer(QaEntry::new("q", "a"));
                state.qa_history.len()
            })
            .await;

        assert_eq!(len, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_touch_fresh_records_activity() {
        let store = store();
        let id = SessionId::new();
        let now = Utc::now();

        assert_eq!(store.touch(&id, now).await, GateState::Fresh);
        assert_eq!(store.get(&id).await.last_activity, Some(now));
    }

    #[tokio::test]
    async fn test_touch_at_exact_timeout_stays_active() {
        let store = store();
        let id = SessionId::new();
        let start = Utc::now();
        store.touch(&id, start).await;
        store.put(&id, {
            let mut s = with_document("doc");
            s.last_activity = Some(start);
            s
        })
        .await;

        let now = start + TimeDelta::seconds(120);
        assert_eq!(store.touch(&id, now).await, GateState::Active);

        let state = store.get(&id).await;
        assert_eq!(state.context.as_deref(), Some("doc"));
        assert_eq!(state.last_activity, Some(now));
        assert!(!state.session_ended);
    }

    #[tokio::test]
    async fn test_touch_past_timeout_clears_and_marks() {
        let store = store();
        let id = SessionId::new();
        let start = Utc::now();
        let mut state = with_document("doc");
        state.record_answer(QaEntry::new("q", "a"));
        state.last_activity = Some(start);
        store.put(&id, state).await;

        let outcome = store.touch(&id, start + TimeDelta::seconds(121)).await;
        assert!(outcome.is_expired());

        let state = store.get(&id).await;
        assert!(state.session_ended);
        assert!(state.context.is_none());
        assert!(state.summary.is_none());
        assert!(state.qa_history.is_empty());
        assert!(state.last_activity.is_none());
    }

    #[tokio::test]
    async fn test_touch_with_notice_pending_passes_through() {
        let store = store();
        let id = SessionId::new();
        store.put(&id, SessionState::expired()).await;

        let outcome = store.touch(&id, Utc::now()).await;

        assert_eq!(outcome, GateState::NoticePending);
        assert!(store.get(&id).await.last_activity.is_none());
    }

    #[tokio::test]
    async fn test_take_session_ended_is_one_shot() {
        let store = store();
        let id = SessionId::new();
        store.put(&id, SessionState::expired()).await;

        assert!(store.take_session_ended(&id).await);
        assert!(!store.take_session_ended(&id).await);
        assert!(!store.take_session_ended(&SessionId::new()).await);
    }

    #[tokio::test]
    async fn test_expired_session_becomes_fresh_after_notice() {
        let store = store();
        let id = SessionId::new();
        let start = Utc::now();
        store.touch(&id, start).await;

        let later = start + TimeDelta::seconds(200);
        assert!(store.touch(&id, later).await.is_expired());
        assert!(store.take_session_ended(&id).await);
        assert_eq!(store.touch(&id, later).await, GateState::Fresh);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = SessionStore::new(SessionConfig::new().with_max_sessions(2));
        let ids: Vec<SessionId> = (0..3).map(|_| SessionId::new()).collect();

        for id in &ids {
            store.touch(id, Utc::now()).await;
        }

        assert_eq!(store.len().await, 2);
        assert!(store.get(&ids[0]).await.last_activity.is_none());
        assert!(store.get(&ids[2]).await.last_activity.is_some());
    }

    #[tokio::test]
    async fn test_clone_shares_records() {
        let store = store();
        let other = store.clone();
        let id = SessionId::new();

        store.put(&id, with_document("shared")).await;

        assert_eq!(other.get(&id).await.context.as_deref(), Some("shared"));
    }
}
