//! Core types for Chatdeck: sessions, messages, tokens and credentials.
//!
//! Wire-compatible with the chat backend: sessions arrive as
//! `{"_id": "...", "created_at": "..."}` and stored history messages as
//! `{"role": "user" | "assistant", "content": "...", "timestamp": "..."}`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// A persisted conversation thread, owned by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }
}

/// A session plus its stored transcript (`GET /sessions/{id}`).
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SessionHistory {
    #[serde(flatten)]
    pub session: Session,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

/// One turn as the backend persists it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        let sender = if stored.role == "user" {
            Sender::User
        } else {
            Sender::Bot
        };
        Message {
            text: stored.content,
            sender,
            timestamp: stored.timestamp,
        }
    }
}

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// Who authored a message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One turn in the chat view's transcript.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A message typed by the user, stamped now.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    /// A reply from the bot, stamped now.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Reply to `POST /chat`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

// ─────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────

/// Opaque bearer credential issued by the backend.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Body of `POST /login`.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body of `POST /register`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Registration {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub email: String,
}

// ─────────────────────────────────────────────
// Timestamps
// ─────────────────────────────────────────────

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00+00:00`) as well as offset-less
/// ISO 8601 (`2024-05-01T12:00:00.123000`), which the backend emits for
/// naive UTC datetimes.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
