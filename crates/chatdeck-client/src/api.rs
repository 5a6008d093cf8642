//! The backend contract consumed by the shell, sidebar and chat view.

use async_trait::async_trait;
use serde::Serialize;

use chatdeck_core::types::{
    AuthToken, ChatReply, Credentials, Registration, Session, SessionHistory,
};

use crate::error::ApiResult;

/// Body of `POST /chat`.
///
/// `session_id` is sent as `null` for a new conversation; the backend then
/// allocates a session and returns its id.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_id,
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }
}

/// Remote chat/authentication backend.
///
/// Every protected call takes the bearer token explicitly; the caller owns
/// token storage.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `POST /login`: exchange credentials for a token.
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken>;

    /// `POST /register`: create an account.
    ///
    /// Returns a token only if the backend issues one on registration.
    async fn register(&self, registration: &Registration) -> ApiResult<Option<AuthToken>>;

    /// `GET /validate-token`: confirm the token is still accepted.
    ///
    /// Returns the username when the backend reports it.
    async fn validate_token(&self, token: &AuthToken) -> ApiResult<Option<String>>;

    /// `GET /sessions`: the user's sessions in backend order.
    async fn list_sessions(&self, token: &AuthToken) -> ApiResult<Vec<Session>>;

    /// `GET /sessions/{id}`: one session with its stored transcript.
    async fn fetch_session(&self, token: &AuthToken, session_id: &str) -> ApiResult<SessionHistory>;

    /// `DELETE /sessions/{id}`.
    async fn delete_session(&self, token: &AuthToken, session_id: &str) -> ApiResult<()>;

    /// `POST /chat`: send one message and receive the reply.
    async fn send_message(&self, token: &AuthToken, request: &ChatRequest) -> ApiResult<ChatReply>;
}
