//! Configuration schema.
//!
//! Hierarchy: `Config` → `ApiConfig`, `AuthConfig`, `ChatConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Text shown in place of a bot reply when `/chat` fails.
pub const DEFAULT_ERROR_TEXT: &str = "Sorry, there was an error processing your message.";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.chatdeck/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub chat: ChatConfig,
}

// ─────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────

/// Where the backend lives and how long to wait for it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    /// Base URL of the chat backend, without a trailing path.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Token handling.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Validate a stored token against `/validate-token` on start.
    pub validate_on_start: bool,
    /// Override for the token file (defaults to `~/.chatdeck/token`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            validate_on_start: true,
            token_file: None,
        }
    }
}

/// Chat view behaviour.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Optional location hint forwarded with every message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Fallback bot text appended when a send fails.
    pub error_text: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            location: None,
            error_text: DEFAULT_ERROR_TEXT.to_string(),
        }
    }
}
