//! The assembled front end: shell, sidebar and chat view sharing one context.

use std::sync::Arc;

use tracing::debug;

use chatdeck_client::ChatApi;
use chatdeck_core::{AuthState, Config, TokenStore};

use crate::chat::ChatView;
use crate::context::AppContext;
use crate::shell::{Route, RouteDecision, Shell};
use crate::sidebar::{DeleteOutcome, SessionSelection, Sidebar};

pub struct App {
    pub shell: Shell,
    pub sidebar: Sidebar,
    pub chat: ChatView,
}

impl App {
    pub fn new(api: Arc<dyn ChatApi>, tokens: Arc<dyn TokenStore>, config: &Config) -> Self {
        let ctx = AppContext::new(api, tokens, AuthState::new());
        Self {
            shell: Shell::new(ctx.clone(), config.auth.clone()),
            sidebar: Sidebar::new(ctx.clone()),
            chat: ChatView::new(ctx, config.chat.clone()),
        }
    }

    pub fn context(&self) -> &AppContext {
        self.shell.context()
    }

    /// Validate the stored token and route from `/`.
    pub async fn start(&mut self) -> RouteDecision {
        self.shell.bootstrap().await;
        let decision = self.shell.navigate(Route::Root);
        self.enter(decision).await;
        decision
    }

    /// Navigate and load whatever the new route needs.
    pub async fn go(&mut self, route: Route) -> RouteDecision {
        let decision = self.shell.navigate(route);
        self.enter(decision).await;
        decision
    }

    async fn enter(&mut self, decision: RouteDecision) {
        if decision == RouteDecision::Render(Route::Chat) {
            debug!("entering chat view");
            self.sidebar.list_sessions().await;
        }
    }

    /// Pass a sidebar selection on to the chat view.
    pub async fn select(&mut self, selection: SessionSelection) -> bool {
        self.chat.open(selection).await
    }

    /// Confirm the pending delete and reset the chat view if needed.
    pub async fn confirm_delete(&mut self) -> DeleteOutcome {
        let outcome = self.sidebar.confirm_delete(self.chat.session_id()).await;
        if let DeleteOutcome::Deleted {
            selection: Some(selection),
            ..
        } = &outcome
        {
            self.chat.open(selection.clone()).await;
        }
        outcome
    }

    /// Sign out and reset both panes.
    pub async fn logout(&mut self) -> Route {
        let route = self.shell.logout();
        self.chat.open(SessionSelection::NewChat).await;
        self.sidebar.cancel_delete();
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session, FakeApi};
    use chatdeck_core::{AuthToken, MemoryTokenStore};

    fn app(api: &FakeApi, token: Option<&str>) -> App {
        let tokens = match token {
            Some(t) => MemoryTokenStore::with_token(AuthToken::new(t)),
            None => MemoryTokenStore::new(),
        };
        App::new(Arc::new(api.clone()), Arc::new(tokens), &Config::default())
    }

    #[tokio::test]
    async fn start_signed_in_loads_sessions() {
        let api = FakeApi::new();
        api.accept_token("t", "alice");
        api.set_sessions(vec![session("s1", 1)]);
        let mut app = app(&api, Some("t"));

        assert_eq!(app.start().await, RouteDecision::Render(Route::Chat));
        assert_eq!(app.sidebar.sessions().len(), 1);
    }

    #[tokio::test]
    async fn start_signed_out_shows_login() {
        let api = FakeApi::new();
        let mut app = app(&api, None);

        assert_eq!(app.start().await, RouteDecision::Render(Route::Login));
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn new_chat_delete_cycle() {
        let api = FakeApi::new();
        api.accept_token("t", "alice");
        api.reply("Hi", Some("abc123"));
        let mut app = app(&api, Some("t"));
        app.start().await;

        app.chat.send("Hello").await.unwrap();
        assert_eq!(app.chat.session_id(), Some("abc123"));

        api.set_sessions(vec![session("abc123", 1)]);
        app.sidebar.list_sessions().await;
        assert!(app.sidebar.request_delete("abc123"));

        let outcome = app.confirm_delete().await;
        assert!(matches!(outcome, DeleteOutcome::Deleted { .. }));
        assert!(app.chat.session_id().is_none());
        assert!(app.chat.messages().is_empty());
        assert!(app.sidebar.sessions().is_empty());
    }

    #[tokio::test]
    async fn logout_resets_panes() {
        let api = FakeApi::new();
        api.accept_token("t", "alice");
        api.reply("Hi", Some("abc"));
        let mut app = app(&api, Some("t"));
        app.start().await;
        app.chat.send("Hello").await.unwrap();

        assert_eq!(app.logout().await, Route::Login);
        assert!(app.chat.messages().is_empty());
        assert!(app.context().token().is_none());
        assert_eq!(app.go(Route::Chat).await, RouteDecision::Render(Route::Login));
    }
}
