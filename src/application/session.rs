//! Shared marketplace session.
//!
//! The access token is replaced as a whole value. Readers clone an `Arc` to
//! the current session and keep using it for the request in flight, so a
//! refresh is never seen half-written.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// One generation of marketplace credentials.
#[derive(Clone)]
pub struct Session {
    access_token: Option<String>,
    updated_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Process-wide holder of the current [`Session`].
#[derive(Debug)]
pub struct SessionStore {
    current: RwLock<Arc<Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            current: RwLock::new(Arc::new(build(access_token))),
        }
    }

    /// The session in effect right now.
    #[must_use]
    pub fn current(&self) -> Arc<Session> {
        self.current.read().clone()
    }

    /// Swap in a new token. Blank tokens clear the session.
    pub fn replace(&self, access_token: Option<String>) {
        let next = Arc::new(build(access_token));
        *self.current.write() = next;
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

fn build(access_token: Option<String>) -> Session {
    Session {
        access_token: access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_unauthenticated() {
        let store = SessionStore::new(Some("   ".into()));
        assert!(!store.current().is_authenticated());
    }

    #[test]
    fn replace_does_not_affect_held_snapshot() {
        let store = SessionStore::new(Some("old".into()));
        let held = store.current();
        store.replace(Some(" new ".into()));
        assert_eq!(held.access_token(), Some("old"));
        assert_eq!(store.current().access_token(), Some("new"));
    }

    #[test]
    fn debug_redacts_token() {
        let store = SessionStore::new(Some("secret".into()));
        let rendered = format!("{:?}", store.current());
        assert!(!rendered.contains("secret"));
    }
}
