//! Shared holder of the current session
//!
//! The REST client, storage client and realtime socket all read the access
//! token from here; the auth client is the only writer.

use alpaca_core::{RecordId, Session};
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle to the signed-in session (if any)
#[derive(Debug, Clone, Default)]
pub struct SessionToken {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionToken {
    /// Create an empty (signed-out) holder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder that starts signed in
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Current session
    pub fn get(&self) -> Option<Session> {
        self.inner.read().clone()
    }

    /// Replace the session; returns the previous one
    pub fn set(&self, session: Session) -> Option<Session> {
        self.inner.write().replace(session)
    }

    /// Drop the session
    pub fn clear(&self) -> Option<Session> {
        self.inner.write().take()
    }

    /// Access token of the current session
    pub fn access_token(&self) -> Option<String> {
        self.inner.read().as_ref().map(|s| s.access_token.clone())
    }

    /// Refresh token of the current session
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read().as_ref().and_then(|s| s.refresh_token.clone())
    }

    /// ID of the signed-in user
    pub fn user_id(&self) -> Option<RecordId> {
        self.inner.read().as_ref().map(|s| s.user_id)
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.read().is_some()
    }
}
