//! Process-wide authentication state with explicit subscribe/notify.
//!
//! Backed by a `tokio::sync::watch` channel: every holder of a receiver sees
//! the latest [`AuthStatus`] and can await changes.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Where the user stands with the backend.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// No valid token.
    #[default]
    Unauthenticated,
    /// A stored token is being checked against the backend.
    Validating,
    /// Token accepted. `username` is known once the backend has confirmed it.
    Authenticated { username: Option<String> },
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthStatus::Authenticated { username } => username.as_deref(),
            _ => None,
        }
    }
}

/// Shared auth state. Cloning yields another handle on the same state.
#[derive(Clone, Debug)]
pub struct AuthState {
    tx: Arc<watch::Sender<AuthStatus>>,
}

impl AuthState {
    /// Starts unauthenticated.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthStatus::Unauthenticated);
        Self { tx: Arc::new(tx) }
    }

    pub fn status(&self) -> AuthStatus {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.tx.subscribe()
    }

    /// Publish a new status. Subscribers are only woken on actual change.
    pub fn set(&self, status: AuthStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                debug!(from = ?current, to = ?status, "auth status changed");
                *current = status;
                true
            }
        });
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}
