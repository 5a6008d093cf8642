//! Sidebar: the user's session list.
//!
//! Listing failures degrade to an empty list. Deletion is two-step: a
//! request opens a confirmation, and only an explicit confirm issues the
//! `DELETE`. The confirmation is dismissed whatever the outcome.

use tracing::{debug, info, warn};

use chatdeck_core::Session;

use crate::context::AppContext;

/// Which conversation the chat view should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSelection {
    /// A fresh conversation with no session bound yet.
    NewChat,
    Existing(String),
}

/// Result of confirming a delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No confirmation was open.
    NothingPending,
    /// Deleted. Carries `NewChat` when the active session was removed.
    Deleted {
        id: String,
        selection: Option<SessionSelection>,
    },
    /// The backend refused or was unreachable. `notice` is meant for the user.
    Failed { id: String, notice: String },
}

pub struct Sidebar {
    ctx: AppContext,
    sessions: Vec<Session>,
    loading: bool,
    pending_delete: Option<Session>,
}

impl Sidebar {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            sessions: Vec::new(),
            loading: true,
            pending_delete: None,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Look a session up by its position in the list (1-based) or by id.
    pub fn find(&self, key: &str) -> Option<&Session> {
        if let Ok(n) = key.parse::<usize>() {
            if n >= 1 {
                if let Some(session) = self.sessions.get(n - 1) {
                    return Some(session);
                }
            }
        }
        self.sessions.iter().find(|s| s.id == key)
    }

    /// Fetch the session list, keeping the backend's order.
    pub async fn list_sessions(&mut self) {
        self.loading = true;
        let result = match self.ctx.require_token() {
            Ok(token) => self.ctx.api().list_sessions(&token).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(sessions) => {
                debug!(count = sessions.len(), "sessions loaded");
                self.sessions = sessions;
            }
            Err(e) => {
                warn!(error = %e, "error fetching sessions");
                self.ctx.handle_failure(&e);
                self.sessions.clear();
            }
        }
        self.loading = false;
    }

    pub fn select_new_chat(&self) -> SessionSelection {
        SessionSelection::NewChat
    }

    pub fn select_session(&self, id: impl Into<String>) -> SessionSelection {
        SessionSelection::Existing(id.into())
    }

    // ── delete confirmation ──

    /// Open the confirmation for `id`. Returns `false` for unknown ids.
    pub fn request_delete(&mut self, id: &str) -> bool {
        match self.sessions.iter().find(|s| s.id == id) {
            Some(session) => {
                self.pending_delete = Some(session.clone());
                true
            }
            None => false,
        }
    }

    pub fn pending_delete(&self) -> Option<&Session> {
        self.pending_delete.as_ref()
    }

    /// Dismiss the confirmation without changing anything.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the pending session.
    ///
    /// `active` is the chat view's current session id. On success the list is
    /// re-fetched.
    pub async fn confirm_delete(&mut self, active: Option<&str>) -> DeleteOutcome {
        let Some(session) = self.pending_delete.take() else {
            return DeleteOutcome::NothingPending;
        };

        let result = match self.ctx.require_token() {
            Ok(token) => self.ctx.api().delete_session(&token, &session.id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(session = %session.id, "session deleted");
                let selection =
                    (active == Some(session.id.as_str())).then_some(SessionSelection::NewChat);
                self.list_sessions().await;
                DeleteOutcome::Deleted {
                    id: session.id,
                    selection,
                }
            }
            Err(e) => {
                warn!(session = %session.id, error = %e, "error deleting session");
                self.ctx.handle_failure(&e);
                DeleteOutcome::Failed {
                    id: session.id,
                    notice: format!("Could not delete chat: {}", e.user_message()),
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
