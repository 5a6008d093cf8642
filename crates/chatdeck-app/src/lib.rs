//! Chatdeck front end: renderer-independent state machines.
//!
//! - **shell**: auth gate and routing
//! - **sidebar**: session list with two-step delete
//! - **chat**: message exchange with single-flight sends
//! - **auth_forms**: login/registration validation and submission
//! - **app**: the three panes wired to one [`context::AppContext`]

pub mod app;
pub mod auth_forms;
pub mod chat;
pub mod context;
pub mod shell;
pub mod sidebar;

#[cfg(test)]
pub(crate) mod testing;

pub use app::App;
pub use auth_forms::{AuthError, FormError, LoginForm, RegisterForm};
pub use chat::{ChatEvent, ChatState, ChatView, PendingSend, SubmitError};
pub use context::AppContext;
pub use shell::{Route, RouteDecision, Shell};
pub use sidebar::{DeleteOutcome, SessionSelection, Sidebar};
