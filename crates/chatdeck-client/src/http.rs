//! `reqwest`-backed implementation of [`ChatApi`].
//!
//! All requests share one connection-pooled client with a per-request
//! timeout taken from `api.timeoutSecs`. Error bodies of the form
//! `{"message": "..."}` are surfaced through [`ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, warn};

use chatdeck_core::config::ApiConfig;
use chatdeck_core::types::{
    AuthToken, ChatReply, Credentials, Registration, Session, SessionHistory,
};

use crate::api::{ChatApi, ChatRequest};
use crate::error::{ApiError, ApiResult};

#[derive(Deserialize)]
struct TokenBody {
    token: Option<String>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ValidateBody {
    username: Option<String>,
}

// ─────────────────────────────────────────────
// HttpApiClient
// ─────────────────────────────────────────────

/// HTTP client for the chat backend.
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Network(e)
        }
    }

    /// Send a request, mapping transport failures and non-success statuses.
    async fn execute(&self, request: reqwest::RequestBuilder, what: &str) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            error!(call = what, error = %e, "HTTP request failed");
            self.transport_error(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(call = what, status = %status, "backend responded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    body.clone()
                }
            });

        warn!(call = what, status = %status, message = %message, "backend rejected request");

        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, what: &str) -> ApiResult<T> {
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                return ApiError::Timeout(self.timeout);
            }
            error!(call = what, error = %e, "failed to parse backend response");
            ApiError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl ChatApi for HttpApiClient {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        let request = self.client.post(self.url("/login")).json(credentials);
        let response = self.execute(request, "login").await?;
        let body: TokenBody = self.decode(response, "login").await?;
        body.token
            .filter(|t| !t.is_empty())
            .map(AuthToken::new)
            .ok_or_else(|| ApiError::Decode("login response has no token".to_string()))
    }

    async fn register(&self, registration: &Registration) -> ApiResult<Option<AuthToken>> {
        let request = self.client.post(self.url("/register")).json(registration);
        let response = self.execute(request, "register").await?;
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let token = serde_json::from_str::<TokenBody>(&body)
            .ok()
            .and_then(|b| b.token)
            .filter(|t| !t.is_empty())
            .map(AuthToken::new);
        debug!(issued_token = token.is_some(), "registration accepted");
        Ok(token)
    }

    async fn validate_token(&self, token: &AuthToken) -> ApiResult<Option<String>> {
        let request = self
            .client
            .get(self.url("/validate-token"))
            .bearer_auth(token.as_str());
        let response = self.execute(request, "validate_token").await?;
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_str::<ValidateBody>(&body)
            .ok()
            .and_then(|b| b.username))
    }

    async fn list_sessions(&self, token: &AuthToken) -> ApiResult<Vec<Session>> {
        let request = self
            .client
            .get(self.url("/sessions"))
            .bearer_auth(token.as_str());
        let response = self.execute(request, "list_sessions").await?;
        self.decode(response, "list_sessions").await
    }

    async fn fetch_session(&self, token: &AuthToken, session_id: &str) -> ApiResult<SessionHistory> {
        let request = self
            .client
            .get(self.url(&format!("/sessions/{session_id}")))
            .bearer_auth(token.as_str());
        let response = self.execute(request, "fetch_session").await?;
        self.decode(response, "fetch_session").await
    }

    async fn delete_session(&self, token: &AuthToken, session_id: &str) -> ApiResult<()> {
        let request = self
            .client
            .delete(self.url(&format!("/sessions/{session_id}")))
            .bearer_auth(token.as_str());
        self.execute(request, "delete_session").await?;
        Ok(())
    }

    async fn send_message(&self, token: &AuthToken, chat: &ChatRequest) -> ApiResult<ChatReply> {
        debug!(
            session = chat.session_id.as_deref().unwrap_or("<new>"),
            chars = chat.message.chars().count(),
            "sending chat message"
        );
        let request = self
            .client
            .post(self.url("/chat"))
            .bearer_auth(token.as_str())
            .json(chat);
        let response = self.execute(request, "send_message").await?;
        self.decode(response, "send_message").await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
