//! Chatdeck core: shared types, configuration, token storage and auth state.
//!
//! - **types**: sessions, messages, tokens and credentials
//! - **config**: JSON config with env var overrides
//! - **storage**: persistent token store
//! - **auth**: process-wide auth status with subscribe/notify

pub mod auth;
pub mod config;
pub mod storage;
pub mod types;
pub mod utils;

pub use auth::{AuthState, AuthStatus};
pub use config::Config;
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
pub use types::{AuthToken, ChatReply, Credentials, Message, Registration, Sender, Session, SessionHistory};
