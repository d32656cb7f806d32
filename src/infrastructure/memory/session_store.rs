//! In-Memory Session Store Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{SessionError, SessionStorePort};
use crate::domain::session::{Session, SessionId};

/// 内存会话存储
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorePort for InMemorySessionStore {
    fn create(&self, session: Session) -> Result<SessionId, SessionError> {
        let session_id = session.id().clone();
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::AlreadyExists(session_id));
        }
        self.sessions.insert(session_id.clone(), session);
        tracing::info!(session_id = %session_id, "Session created");
        Ok(session_id)
    }

    fn get(&self, id: &SessionId) -> Result<Session, SessionError> {
        self.sessions
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    fn modify(&self, id: &SessionId, f: &mut dyn FnMut(&mut Session)) -> Result<(), SessionError> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        f(session.value_mut());
        Ok(())
    }

    fn is_valid(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    fn close(&self, id: &SessionId) -> Result<Session, SessionError> {
        self.sessions
            .remove(id)
            .map(|(_, session)| {
                tracing::info!(session_id = %id, "Session closed");
                session
            })
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    fn touch(&self, id: &SessionId) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.touch();
        }
    }

    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<SessionId> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity();
                if elapsed > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}
