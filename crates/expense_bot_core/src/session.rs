//! crates/expense_bot_core/src/session.rs
//!
//! The per-user session table. Each operation holds the lock only for one
//! read-modify-write; nothing awaits a port while holding it.
//!
//! Sessions that are never completed stay in memory until the process exits.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{Session, UserId};

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session, replacing whatever the user had in flight.
    /// Returns `true` if an earlier session was overwritten.
    pub async fn insert(&self, user: UserId, session: Session) -> bool {
        self.sessions.lock().await.insert(user, session).is_some()
    }

    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.sessions.lock().await.get(&user).cloned()
    }

    pub async fn remove(&self, user: UserId) -> Option<Session> {
        self.sessions.lock().await.remove(&user)
    }

    /// Runs `f` against the user's session under the lock.
    /// Returns `None` when the user has no session.
    pub async fn update<T>(&self, user: UserId, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        self.sessions.lock().await.get_mut(&user).map(f)
    }

    /// Like [`update`](Self::update), but lets `f` decide whether the session is
    /// taken out of the table; `f` returns the value plus `true` to remove.
    pub async fn update_or_take<T>(
        &self,
        user: UserId,
        f: impl FnOnce(&mut Session) -> (T, bool),
    ) -> Option<(T, Option<Session>)> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&user)?;
        let (value, take) = f(session);
        let taken = if take { sessions.remove(&user) } else { None };
        Some((value, taken))
    }
}
