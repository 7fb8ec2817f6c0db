use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::session::editor::EditSession;

/// In-memory session table shared by all handlers.
///
/// Callers get closure access to one session at a time; the lock is held only for
/// the duration of the closure, so edits to a session are applied one after another.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, EditSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: EditSession) -> Uuid {
        let id = session.id();
        self.inner.write().await.insert(id, session);
        info!(session_id = %id, "session created");
        id
    }

    pub async fn read<R>(&self, id: Uuid, f: impl FnOnce(&EditSession) -> R) -> Option<R> {
        let sessions = self.inner.read().await;
        sessions.get(&id).map(|session| {
            session.mark_active();
            f(session)
        })
    }

    pub async fn write<R>(&self, id: Uuid, f: impl FnOnce(&mut EditSession) -> R) -> Option<R> {
        let mut sessions = self.inner.write().await;
        sessions.get_mut(&id).map(|session| {
            session.mark_active();
            f(session)
        })
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "session closed");
        }
        removed
    }

    /// Drops every session not used since `cutoff` and returns their ids, so the
    /// caller can release whatever else is keyed by them.
    pub async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Vec<Uuid> {
        let mut sessions = self.inner.write().await;
        let idle: Vec<Uuid> = sessions
            .values()
            .filter(|session| session.last_active() < cutoff)
            .map(EditSession::id)
            .collect();
        for id in &idle {
            sessions.remove(id);
        }
        if !idle.is_empty() {
            info!(count = idle.len(), remaining = sessions.len(), "idle sessions expired");
        }
        idle
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
