//! Chat view: the message exchange state machine.
//!
//! ```text
//!            submit (non-empty)
//!   Idle ────────────────────────▶ Sending
//!    ▲                               │
//!    └──── reply / fallback text ◀───┘
//! ```
//!
//! The transcript is append-only and ordered by submit/receive order. At most
//! one send is outstanding; a second submit while `Sending` is rejected.

use tracing::{debug, info, warn};

use chatdeck_client::{ApiResult, ChatRequest};
use chatdeck_core::config::ChatConfig;
use chatdeck_core::{ChatReply, Message};

use crate::context::AppContext;
use crate::sidebar::SessionSelection;

// ─────────────────────────────────────────────
// States & events
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Sending,
}

/// Side effects for the renderer, drained with [`ChatView::take_events`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEvent {
    /// The transcript changed; bring the newest message into view.
    ScrollToLatest,
    /// The backend allocated a session for the new conversation.
    SessionAdopted(String),
    /// The loading indicator turned on or off.
    Loading(bool),
}

/// Why a submit did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("a message is already being sent")]
    Busy,
}

/// An accepted submit whose backend call has not completed yet.
#[derive(Debug)]
#[must_use = "a pending send must be finished"]
pub struct PendingSend {
    request: ChatRequest,
    generation: u64,
}

impl PendingSend {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

// ─────────────────────────────────────────────
// ChatView
// ─────────────────────────────────────────────

pub struct ChatView {
    ctx: AppContext,
    config: ChatConfig,
    messages: Vec<Message>,
    input: String,
    state: ChatState,
    session_id: Option<String>,
    /// Bumped on every session switch so late replies can be recognised.
    generation: u64,
    events: Vec<ChatEvent>,
}

impl ChatView {
    pub fn new(ctx: AppContext, config: ChatConfig) -> Self {
        Self {
            ctx,
            config,
            messages: Vec::new(),
            input: String::new(),
            state: ChatState::Idle,
            session_id: None,
            generation: 0,
            events: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ChatState::Sending
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer. Ignored while a send is pending.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if self.state == ChatState::Idle {
            self.input = text.into();
        }
    }

    /// Whether the send control is enabled.
    pub fn can_send(&self) -> bool {
        self.state == ChatState::Idle && !self.input.trim().is_empty()
    }

    pub fn take_events(&mut self) -> Vec<ChatEvent> {
        std::mem::take(&mut self.events)
    }

    // ── sending ──

    /// Accept the current input: append it, clear the input, enter `Sending`.
    pub fn begin_send(&mut self) -> Result<PendingSend, SubmitError> {
        if self.state == ChatState::Sending {
            debug!("submit rejected, send already in flight");
            return Err(SubmitError::Busy);
        }
        if self.input.trim().is_empty() {
            return Err(SubmitError::Empty);
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(Message::user(text.clone()));
        self.state = ChatState::Sending;
        self.events.push(ChatEvent::ScrollToLatest);
        self.events.push(ChatEvent::Loading(true));

        let request = ChatRequest::new(text, self.session_id.clone())
            .with_location(self.config.location.clone());
        Ok(PendingSend {
            request,
            generation: self.generation,
        })
    }

    /// Apply the outcome of a pending send.
    ///
    /// Replies that arrive after the user switched sessions are dropped.
    pub fn finish_send(&mut self, pending: PendingSend, result: ApiResult<ChatReply>) {
        if pending.generation != self.generation {
            debug!("discarding reply for a conversation that is no longer shown");
            return;
        }

        match result {
            Ok(reply) => {
                if let Some(id) = reply.session_id.filter(|id| !id.is_empty()) {
                    if self.session_id.as_deref() != Some(id.as_str()) {
                        info!(session = %id, "conversation bound to session");
                        self.session_id = Some(id.clone());
                        self.events.push(ChatEvent::SessionAdopted(id));
                    }
                }
                self.messages.push(Message::bot(reply.response));
            }
            Err(e) => {
                warn!(error = %e, "error sending message");
                self.ctx.handle_failure(&e);
                self.messages.push(Message::bot(self.config.error_text.clone()));
            }
        }

        self.state = ChatState::Idle;
        self.events.push(ChatEvent::Loading(false));
        self.events.push(ChatEvent::ScrollToLatest);
    }

    /// Issue the backend call for an accepted submit.
    pub async fn dispatch(&self, pending: &PendingSend) -> ApiResult<ChatReply> {
        let token = self.ctx.require_token()?;
        self.ctx.api().send_message(&token, pending.request()).await
    }

    /// Submit the current input and wait for the reply.
    pub async fn submit(&mut self) -> Result<(), SubmitError> {
        let pending = self.begin_send()?;
        let result = self.dispatch(&pending).await;
        self.finish_send(pending, result);
        Ok(())
    }

    /// Set the input and submit it in one step.
    pub async fn send(&mut self, text: impl Into<String>) -> Result<(), SubmitError> {
        if self.state == ChatState::Sending {
            return Err(SubmitError::Busy);
        }
        self.set_input(text);
        self.submit().await
    }

    // ── session switching ──

    /// Follow a selection made in the sidebar.
    ///
    /// The transcript is reset; for an existing session its stored history is
    /// fetched. Returns `false` if the history could not be loaded.
    pub async fn open(&mut self, selection: SessionSelection) -> bool {
        match selection {
            SessionSelection::NewChat => {
                self.reset(None);
                true
            }
            SessionSelection::Existing(id) => {
                self.reset(Some(id.clone()));
                self.load_history(&id).await
            }
        }
    }

    fn reset(&mut self, session_id: Option<String>) {
        self.generation += 1;
        self.messages.clear();
        self.input.clear();
        self.session_id = session_id;
        if self.state == ChatState::Sending {
            self.state = ChatState::Idle;
            self.events.push(ChatEvent::Loading(false));
        }
        self.events.push(ChatEvent::ScrollToLatest);
    }

    async fn load_history(&mut self, id: &str) -> bool {
        let result = match self.ctx.require_token() {
            Ok(token) => self.ctx.api().fetch_session(&token, id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(history) => {
                debug!(session = id, messages = history.messages.len(), "history loaded");
                self.messages = history.messages.into_iter().map(Message::from).collect();
                self.events.push(ChatEvent::ScrollToLatest);
                true
            }
            Err(e) => {
                warn!(session = id, error = %e, "error loading session history");
                self.ctx.handle_failure(&e);
                false
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session, signed_in};
    use chatdeck_core::config::schema::DEFAULT_ERROR_TEXT;
    use chatdeck_core::Sender;

    fn view() -> (crate::testing::FakeApi, ChatView) {
        let (api, ctx) = signed_in();
        (api, ChatView::new(ctx, ChatConfig::default()))
    }

    fn texts(view: &ChatView) -> Vec<(Sender, String)> {
        view.messages()
            .iter()
            .map(|m| (m.sender, m.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn first_message_adopts_session() {
        let (api, mut view) = view();
        api.reply("Hi", Some("abc123"));

        view.send("Hello").await.unwrap();

        assert_eq!(
            texts(&view),
            vec![(Sender::User, "Hello".into()), (Sender::Bot, "Hi".into())]
        );
        assert_eq!(view.session_id(), Some("abc123"));
        assert!(!view.is_loading());
        assert!(api.chat_requests()[0].session_id.is_none());
    }

    #[tokio::test]
    async fn follow_up_uses_adopted_session() {
        let (api, mut view) = view();
        api.reply("Hi", Some("abc123"));
        api.reply("Fine", Some("abc123"));

        view.send("Hello").await.unwrap();
        view.send("How are you?").await.unwrap();

        let requests = api.chat_requests();
        assert_eq!(requests[1].session_id.as_deref(), Some("abc123"));
        assert_eq!(view.messages().len(), 4);
    }

    #[tokio::test]
    async fn order_follows_events_not_timestamps() {
        let (api, mut view) = view();
        api.reply("one", Some("s"));
        api.reply("two", Some("s"));

        view.send("a").await.unwrap();
        view.send("b").await.unwrap();

        let order: Vec<String> = view.messages().iter().map(|m| m.text.clone()).collect();
        assert_eq!(order, vec!["a", "one", "b", "two"]);
    }

    #[tokio::test]
    async fn empty_and_whitespace_are_noops() {
        let (api, mut view) = view();

        assert_eq!(view.send("").await, Err(SubmitError::Empty));
        assert_eq!(view.send("   \n\t").await, Err(SubmitError::Empty));

        assert!(view.messages().is_empty());
        assert!(api.chat_requests().is_empty());
        assert!(view.take_events().is_empty());
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let (_api, mut view) = view();
        view.set_input("first");
        let pending = view.begin_send().unwrap();

        assert!(view.is_loading());
        assert_eq!(view.input(), "");
        assert!(!view.can_send());

        view.set_input("second");
        assert_eq!(view.input(), "", "input is disabled while sending");
        assert_eq!(view.begin_send().unwrap_err(), SubmitError::Busy);
        assert_eq!(view.messages().len(), 1);

        view.finish_send(
            pending,
            Ok(ChatReply {
                response: "ok".into(),
                session_id: Some("s1".into()),
            }),
        );
        assert_eq!(view.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn failure_appends_single_fallback() {
        let (api, mut view) = view();
        api.fail_chat(500, "boom");

        view.send("Hello").await.unwrap();

        assert_eq!(
            texts(&view),
            vec![
                (Sender::User, "Hello".into()),
                (Sender::Bot, DEFAULT_ERROR_TEXT.into())
            ]
        );
        assert!(!view.is_loading());
        assert!(view.session_id().is_none());

        // Conversation stays usable
        api.reply("Back", Some("s9"));
        view.send("Again").await.unwrap();
        assert_eq!(view.messages().len(), 4);
        assert_eq!(view.session_id(), Some("s9"));
    }

    #[tokio::test]
    async fn unauthorized_send_signs_out() {
        let (api, mut view) = view();
        api.fail_chat(401, "Invalid token!");

        view.send("Hello").await.unwrap();

        assert!(!view.ctx.auth().is_authenticated());
        assert!(view.ctx.token().is_none());
        assert_eq!(view.messages().len(), 2);
    }

    #[tokio::test]
    async fn events_track_transcript_changes() {
        let (api, mut view) = view();
        api.reply("Hi", Some("abc"));

        view.send("Hello").await.unwrap();

        assert_eq!(
            view.take_events(),
            vec![
                ChatEvent::ScrollToLatest,
                ChatEvent::Loading(true),
                ChatEvent::SessionAdopted("abc".into()),
                ChatEvent::Loading(false),
                ChatEvent::ScrollToLatest,
            ]
        );
        assert!(view.take_events().is_empty());
    }

    #[tokio::test]
    async fn location_is_attached() {
        let (api, ctx) = signed_in();
        let config = ChatConfig {
            location: Some("Oslo".into()),
            ..ChatConfig::default()
        };
        let mut view = ChatView::new(ctx, config);
        api.reply("Sunny", Some("s"));

        view.send("Weather?").await.unwrap();
        assert_eq!(api.chat_requests()[0].location.as_deref(), Some("Oslo"));
    }

    #[tokio::test]
    async fn opening_existing_session_loads_history() {
        let (api, mut view) = view();
        api.set_sessions(vec![session("s1", 1)]);
        api.set_history("s1", &[("user", "Hello"), ("assistant", "Hi")]);
        api.reply("first", Some("new"));
        view.send("Something else").await.unwrap();

        assert!(view.open(SessionSelection::Existing("s1".into())).await);

        assert_eq!(view.session_id(), Some("s1"));
        assert_eq!(
            texts(&view),
            vec![(Sender::User, "Hello".into()), (Sender::Bot, "Hi".into())]
        );
    }

    #[tokio::test]
    async fn opening_missing_session_leaves_empty_transcript() {
        let (_api, mut view) = view();
        assert!(!view.open(SessionSelection::Existing("ghost".into())).await);
        assert_eq!(view.session_id(), Some("ghost"));
        assert!(view.messages().is_empty());
    }

    #[tokio::test]
    async fn new_chat_resets() {
        let (api, mut view) = view();
        api.reply("Hi", Some("abc"));
        view.send("Hello").await.unwrap();

        view.open(SessionSelection::NewChat).await;

        assert!(view.session_id().is_none());
        assert!(view.messages().is_empty());
    }

    #[test]
    fn late_reply_after_switch_is_dropped() {
        let (_api, mut view) = view();
        view.set_input("Hello");
        let pending = view.begin_send().unwrap();

        view.reset(Some("other".into()));
        assert!(!view.is_loading());

        view.finish_send(
            pending,
            Ok(ChatReply {
                response: "late".into(),
                session_id: Some("abc".into()),
            }),
        );
        assert_eq!(view.session_id(), Some("other"));
        assert!(view.messages().is_empty());
    }
}
