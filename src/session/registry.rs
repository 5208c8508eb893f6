//! Registry of live sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info};

use super::{Session, SessionId};

/// All live sessions, keyed by identifier.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
    ttl: Duration,
}

impl SessionRegistry {
    /// Create an empty registry whose sessions expire after `ttl` of
    /// inactivity.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Open a fresh session.
    #[must_use]
    pub fn open(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(SessionId::new()));
        self.sessions.insert(session.id(), Arc::clone(&session));
        info!(session = %session.id(), "Session opened");
        session
    }

    /// Look up a live session and record activity on it.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        let session = self.sessions.get(&id).map(|entry| Arc::clone(entry.value()))?;
        session.touch();
        Some(session)
    }

    /// Return the session named by `id`, or open a new one when the id is
    /// missing or unknown. The flag tells whether a session was opened.
    #[must_use]
    pub fn resolve(&self, id: Option<SessionId>) -> (Arc<Session>, bool) {
        id.and_then(|id| self.get(id))
            .map_or_else(|| (self.open(), true), |session| (session, false))
    }

    /// End a session: drop its state and cancel its in-flight requests.
    pub fn end(&self, id: SessionId) -> bool {
        let Some((_, session)) = self.sessions.remove(&id) else {
            return false;
        };
        session.cancel();
        info!(session = %id, "Session ended");
        true
    }

    /// End every session idle for longer than the TTL. Returns how many were
    /// removed.
    #[must_use]
    pub fn evict_idle(&self) -> usize {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff = Utc::now().timestamp_millis().saturating_sub(ttl_ms);

        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().last_seen_ms() < cutoff)
            .map(|entry| *entry.key())
            .collect();

        let removed = expired.into_iter().filter(|id| self.end(*id)).count();
        if removed > 0 {
            debug!(removed, remaining = self.len(), "Evicted idle sessions");
        }
        removed
    }

    /// End all sessions.
    pub fn shutdown(&self) {
        let ids: Vec<SessionId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        let ended = ids.into_iter().filter(|id| self.end(*id)).count();
        info!(ended, "All sessions ended");
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
