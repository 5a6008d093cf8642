//! Handles shared by the shell, sidebar and chat view.

use std::sync::Arc;

use tracing::{error, warn};

use chatdeck_client::{ApiError, ApiResult, ChatApi};
use chatdeck_core::{AuthState, AuthStatus, AuthToken, StorageError, TokenStore};

/// Backend client, token storage and auth state, cheaply cloneable.
#[derive(Clone)]
pub struct AppContext {
    api: Arc<dyn ChatApi>,
    tokens: Arc<dyn TokenStore>,
    auth: AuthState,
}

impl AppContext {
    pub fn new(api: Arc<dyn ChatApi>, tokens: Arc<dyn TokenStore>, auth: AuthState) -> Self {
        Self { api, tokens, auth }
    }

    pub fn api(&self) -> &dyn ChatApi {
        self.api.as_ref()
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// The stored token, if any. Unreadable storage counts as no token.
    pub fn token(&self) -> Option<AuthToken> {
        match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "failed to read stored token");
                None
            }
        }
    }

    /// The stored token, or `Unauthorized` if there is none.
    pub fn require_token(&self) -> ApiResult<AuthToken> {
        self.token()
            .ok_or_else(|| ApiError::Unauthorized("not logged in".to_string()))
    }

    pub fn store_token(&self, token: &AuthToken) -> Result<(), StorageError> {
        self.tokens.save(token)
    }

    /// Drop the stored token and publish `Unauthenticated`.
    pub fn sign_out(&self) {
        if let Err(e) = self.tokens.clear() {
            error!(error = %e, "failed to remove stored token");
        }
        self.auth.set(AuthStatus::Unauthenticated);
    }

    /// Force a logout when the backend rejected the token.
    pub fn handle_failure(&self, err: &ApiError) {
        if err.is_unauthorized() {
            warn!(error = %err, "token rejected by backend, signing out");
            self.sign_out();
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("auth", &self.auth.status())
            .finish_non_exhaustive()
    }
}
