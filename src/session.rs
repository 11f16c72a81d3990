//! Authenticated session state.
//!
//! The session is an explicit, injectable object with a clear lifecycle:
//! installed on login, replaced on token refresh, destroyed on logout or on
//! a failed refresh. Everything that needs credentials (the REST client, the
//! notification socket) holds a clone of the same `SessionStore`.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::models::user::{AuthTokens, User};

/// One authenticated session: the current user plus its token pair.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: Option<User>,
    pub access: String,
    pub refresh: String,
}

/// Cloneable handle to the session slot. All clones observe the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
    auth_tx: Arc<watch::Sender<bool>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (auth_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(RwLock::new(None)),
            auth_tx: Arc::new(auth_tx),
        }
    }

    /// Install a fresh session (login or register).
    pub fn install(&self, user: User, tokens: AuthTokens) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Session {
            user: Some(user),
            access: tokens.access,
            refresh: tokens.refresh,
        });
        drop(guard);
        let _ = self.auth_tx.send(true);
        tracing::debug!("session installed");
    }

    /// Resume a session from a stored token pair; the user record is filled
    /// in by the first profile fetch.
    pub fn resume(&self, tokens: AuthTokens) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Session {
            user: None,
            access: tokens.access,
            refresh: tokens.refresh,
        });
        drop(guard);
        let _ = self.auth_tx.send(true);
        tracing::debug!("session resumed from stored tokens");
    }

    /// Destroy the session (logout, or refresh failure).
    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        drop(guard);
        let _ = self.auth_tx.send(false);
        tracing::debug!("session cleared");
    }

    /// Swap in a new access token after a successful refresh.
    pub fn update_access(&self, access: String) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = guard.as_mut() {
            session.access = access;
        }
    }

    /// Replace the cached user record (profile update).
    pub fn set_user(&self, user: User) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = guard.as_mut() {
            session.user = Some(user);
        }
    }

    pub fn access_token(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|s| s.access.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|s| s.refresh.clone())
    }

    pub fn current_user(&self) -> Option<User> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().and_then(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.is_some()
    }

    /// Watch the authenticated flag. Used by embedders to react to a forced
    /// logout (e.g. navigate back to a login entry point).
    pub fn watch_authenticated(&self) -> watch::Receiver<bool> {
        self.auth_tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> AuthTokens {
        AuthTokens {
            access: "acc-1".into(),
            refresh: "ref-1".into(),
        }
    }

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "a@b.c",
            "username": "alice",
            "first_name": "Alice",
            "last_name": "A",
        }))
        .unwrap()
    }

    #[test]
    fn test_lifecycle_install_then_clear() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());

        store.install(user(), tokens());
        assert!(store.is_authenticated());
        assert_eq!(store.access_token().as_deref(), Some("acc-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("ref-1"));
        assert_eq!(store.current_user().unwrap().username, "alice");

        store.clear();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_update_access_keeps_refresh() {
        let store = SessionStore::new();
        store.install(user(), tokens());
        store.update_access("acc-2".into());
        assert_eq!(store.access_token().as_deref(), Some("acc-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("ref-1"));
    }

    #[test]
    fn test_watch_sees_forced_logout() {
        let store = SessionStore::new();
        let rx = store.watch_authenticated();
        store.install(user(), tokens());
        assert!(*store.watch_authenticated().borrow());
        store.clear();
        assert!(!*rx.borrow());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.install(user(), tokens());
        assert!(other.is_authenticated());
    }
}
