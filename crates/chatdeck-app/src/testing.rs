//! Scriptable in-memory backend for state machine tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use chatdeck_client::{ApiError, ApiResult, ChatApi, ChatRequest};
use chatdeck_core::types::StoredMessage;
use chatdeck_core::{
    AuthState, AuthToken, ChatReply, Credentials, MemoryTokenStore, Registration, Session,
    SessionHistory,
};

use crate::context::AppContext;

/// A failure to replay: 401 becomes `Unauthorized`, anything else `Status`.
pub fn failure(status: u16, message: &str) -> ApiError {
    if status == 401 {
        ApiError::Unauthorized(message.to_string())
    } else {
        ApiError::Status {
            status,
            message: message.to_string(),
        }
    }
}

pub fn session(id: &str, day: u32) -> Session {
    Session::new(id, Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap())
}

#[derive(Default)]
struct State {
    valid_token: Option<String>,
    username: Option<String>,
    users: Vec<(String, String)>,
    sessions: Vec<Session>,
    histories: Vec<(String, Vec<StoredMessage>)>,
    chat_replies: VecDeque<Result<ChatReply, (u16, String)>>,
    list_failure: Option<(u16, String)>,
    delete_failure: Option<(u16, String)>,
    register_failure: Option<(u16, String)>,
    chat_requests: Vec<ChatRequest>,
    deleted: Vec<String>,
    list_calls: usize,
    offline: bool,
}

/// Fake backend. Clones share state.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn accept_token(&self, token: &str, username: &str) {
        self.with(|s| {
            s.valid_token = Some(token.to_string());
            s.username = Some(username.to_string());
        });
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.with(|s| s.users.push((username.to_string(), password.to_string())));
    }

    pub fn set_sessions(&self, sessions: Vec<Session>) {
        self.with(|s| s.sessions = sessions);
    }

    pub fn set_history(&self, id: &str, turns: &[(&str, &str)]) {
        let messages = turns
            .iter()
            .enumerate()
            .map(|(i, (role, content))| StoredMessage {
                role: role.to_string(),
                content: content.to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, i as u32).unwrap(),
            })
            .collect();
        self.with(|s| s.histories.push((id.to_string(), messages)));
    }

    pub fn reply(&self, response: &str, session_id: Option<&str>) {
        self.with(|s| {
            s.chat_replies.push_back(Ok(ChatReply {
                response: response.to_string(),
                session_id: session_id.map(String::from),
            }))
        });
    }

    pub fn fail_chat(&self, status: u16, message: &str) {
        self.with(|s| s.chat_replies.push_back(Err((status, message.to_string()))));
    }

    pub fn fail_list(&self, status: u16, message: &str) {
        self.with(|s| s.list_failure = Some((status, message.to_string())));
    }

    pub fn fail_delete(&self, status: u16, message: &str) {
        self.with(|s| s.delete_failure = Some((status, message.to_string())));
    }

    pub fn fail_register(&self, status: u16, message: &str) {
        self.with(|s| s.register_failure = Some((status, message.to_string())));
    }

    /// While offline every authenticated call times out.
    pub fn set_offline(&self, offline: bool) {
        self.with(|s| s.offline = offline);
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.with(|s| s.chat_requests.clone())
    }

    pub fn deleted(&self) -> Vec<String> {
        self.with(|s| s.deleted.clone())
    }

    pub fn list_calls(&self) -> usize {
        self.with(|s| s.list_calls)
    }

    fn check(&self, token: &AuthToken) -> ApiResult<()> {
        self.with(|s| match &s.valid_token {
            _ if s.offline => Err(ApiError::Timeout(Duration::from_secs(30))),
            Some(valid) if valid == token.as_str() => Ok(()),
            _ => Err(failure(401, "Invalid token!")),
        })
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        self.with(|s| {
            let known = s
                .users
                .iter()
                .any(|(u, p)| *u == credentials.username && *p == credentials.password);
            if !known {
                return Err(failure(401, "Invalid username or password"));
            }
            let token = format!("jwt-{}", credentials.username);
            s.valid_token = Some(token.clone());
            s.username = Some(credentials.username.clone());
            Ok(AuthToken::new(token))
        })
    }

    async fn register(&self, registration: &Registration) -> ApiResult<Option<AuthToken>> {
        self.with(|s| {
            if let Some((status, msg)) = &s.register_failure {
                return Err(failure(*status, msg));
            }
            s.users.push((
                registration.credentials.username.clone(),
                registration.credentials.password.clone(),
            ));
            Ok(None)
        })
    }

    async fn validate_token(&self, token: &AuthToken) -> ApiResult<Option<String>> {
        self.check(token)?;
        Ok(self.with(|s| s.username.clone()))
    }

    async fn list_sessions(&self, token: &AuthToken) -> ApiResult<Vec<Session>> {
        self.check(token)?;
        self.with(|s| {
            s.list_calls += 1;
            match &s.list_failure {
                Some((status, msg)) => Err(failure(*status, msg)),
                None => Ok(s.sessions.clone()),
            }
        })
    }

    async fn fetch_session(&self, token: &AuthToken, session_id: &str) -> ApiResult<SessionHistory> {
        self.check(token)?;
        self.with(|s| -> ApiResult<SessionHistory> {
            let session = s
                .sessions
                .iter()
                .find(|x| x.id == session_id)
                .cloned()
                .ok_or_else(|| failure(404, "Session not found"))?;
            let messages = s
                .histories
                .iter()
                .find(|(id, _)| id == session_id)
                .map(|(_, m)| m.clone())
                .unwrap_or_default();
            Ok(SessionHistory { session, messages })
        })
    }

    async fn delete_session(&self, token: &AuthToken, session_id: &str) -> ApiResult<()> {
        self.check(token)?;
        self.with(|s| {
            if let Some((status, msg)) = &s.delete_failure {
                return Err(failure(*status, msg));
            }
            let before = s.sessions.len();
            s.sessions.retain(|x| x.id != session_id);
            if s.sessions.len() == before {
                return Err(failure(404, "Session not found"));
            }
            s.deleted.push(session_id.to_string());
            Ok(())
        })
    }

    async fn send_message(&self, token: &AuthToken, request: &ChatRequest) -> ApiResult<ChatReply> {
        self.check(token)?;
        self.with(|s| {
            s.chat_requests.push(request.clone());
            match s.chat_replies.pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err((status, msg))) => Err(failure(status, &msg)),
                None => Err(failure(500, "no scripted reply")),
            }
        })
    }
}

/// Context signed in as `alice` with token `jwt-alice`.
pub fn signed_in() -> (FakeApi, AppContext) {
    let api = FakeApi::new();
    api.add_user("alice", "pw");
    api.accept_token("jwt-alice", "alice");
    let tokens = MemoryTokenStore::with_token(AuthToken::new("jwt-alice"));
    let ctx = AppContext::new(Arc::new(api.clone()), Arc::new(tokens), AuthState::new());
    ctx.auth().set(chatdeck_core::AuthStatus::Authenticated {
        username: Some("alice".into()),
    });
    (api, ctx)
}

/// Context with no stored token.
pub fn signed_out() -> (FakeApi, AppContext) {
    let api = FakeApi::new();
    api.add_user("alice", "pw");
    let ctx = AppContext::new(
        Arc::new(api.clone()),
        Arc::new(MemoryTokenStore::new()),
        AuthState::new(),
    );
    (api, ctx)
}
