//! Chat session state, independent of the DOM.
//!
//! [`UiSession`] owns the conversation, the history store, the view and the
//! single in-flight request. The DOM layer only forwards events to it and
//! performs the network call in between [`UiSession::submit`] and
//! [`UiSession::complete`].

use companion_types::{ChatRequest, Role, Turn, WELCOME_MESSAGE};

use crate::history::{HistoryStore, KeyValueStorage};

pub const EMPTY_REPLY_NOTICE: &str = "Hmm, I couldn't generate a reply. Try again?";
pub const STOPPED_NOTICE: &str = "Request stopped.";
pub const CONNECTION_ERROR_NOTICE: &str = "Sorry, something went wrong connecting to the AI.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Onboarding,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Onboarding,
    ChatIdle,
    ChatLoading,
}

/// Visual style of a message bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bubble {
    User,
    Ai,
}

impl Bubble {
    pub fn class_name(&self) -> &'static str {
        match self {
            Bubble::User => "user",
            Bubble::Ai => "ai",
        }
    }
}

impl From<Role> for Bubble {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Bubble::User,
            Role::Assistant => Bubble::Ai,
        }
    }
}

/// Rendering surface driven by the session
pub trait ChatView {
    fn show_screen(&mut self, screen: Screen);
    fn clear_messages(&mut self);
    fn add_message(&mut self, bubble: Bubble, text: &str);
    fn set_loading(&mut self, loading: bool);
    fn clear_input(&mut self);
}

/// Cancels an outstanding network call
pub trait AbortHandle {
    fn abort(&self);
}

/// How a relay call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Reply(String),
    Cancelled,
    Failed(String),
}

/// Name of the DOM exception raised by an aborted `fetch`
pub const ABORT_ERROR_NAME: &str = "AbortError";

impl RelayOutcome {
    /// Outcome of a call that raised a JS exception
    pub fn from_js_error(name: &str, message: &str) -> Self {
        if name == ABORT_ERROR_NAME {
            RelayOutcome::Cancelled
        } else {
            RelayOutcome::Failed(format!("{}: {}", name, message))
        }
    }

    /// Outcome of a non-2xx response carrying `details` as its body
    pub fn from_status(status: u16, details: &str) -> Self {
        let details = if details.is_empty() {
            "Request failed"
        } else {
            details
        };
        RelayOutcome::Failed(format!("API {}: {}", status, details))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

/// What the caller must send after a successful submit
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub body: ChatRequest,
}

struct InFlight<H> {
    id: RequestId,
    handle: H,
}

pub struct UiSession<S, V, H> {
    store: HistoryStore<S>,
    view: V,
    history: Vec<Turn>,
    screen: Screen,
    in_flight: Option<InFlight<H>>,
    next_request_id: u64,
}

impl<S, V, H> UiSession<S, V, H>
where
    S: KeyValueStorage,
    V: ChatView,
    H: AbortHandle,
{
    /// Load persisted history and show the initial screen
    pub fn start(store: HistoryStore<S>, view: V) -> Self {
        let history = store.load();
        let screen = if history.is_empty() {
            Screen::Onboarding
        } else {
            Screen::Chat
        };

        let mut session = Self {
            store,
            view,
            history,
            screen,
            in_flight: None,
            next_request_id: 0,
        };

        session.view.show_screen(screen);
        if screen == Screen::Chat {
            session.hydrate();
        }
        session
    }

    pub fn state(&self) -> UiState {
        match (self.screen, self.in_flight.is_some()) {
            (Screen::Onboarding, _) => UiState::Onboarding,
            (Screen::Chat, false) => UiState::ChatIdle,
            (Screen::Chat, true) => UiState::ChatLoading,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn hydrate(&mut self) {
        self.view.clear_messages();
        for turn in &self.history {
            self.view.add_message(turn.role.into(), &turn.text);
        }
    }

    fn append(&mut self, turn: Turn) {
        self.view.add_message(turn.role.into(), &turn.text);
        self.history.push(turn);
        self.store.save(&self.history);
    }

    /// Onboarding -> chat; an empty conversation gets the welcome turn
    pub fn create_chat(&mut self) {
        self.screen = Screen::Chat;
        self.view.show_screen(Screen::Chat);
        if self.history.is_empty() {
            self.append(Turn::assistant(WELCOME_MESSAGE));
        }
    }

    /// Chat -> onboarding, dropping any outstanding request silently
    pub fn exit(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
            self.view.set_loading(false);
        }
        self.screen = Screen::Onboarding;
        self.view.show_screen(Screen::Onboarding);
    }

    /// Accept a composer submission.
    ///
    /// Returns `None` when the trimmed text is empty or a request is already
    /// outstanding. Otherwise the user turn is rendered and persisted, the
    /// session enters loading and the returned body must be sent. Its
    /// `history` holds the turns before the new message.
    pub fn submit(&mut self, raw: &str, handle: H) -> Option<PendingRequest> {
        let message = raw.trim();
        if message.is_empty() || self.in_flight.is_some() || self.screen != Screen::Chat {
            return None;
        }

        let prior = self.history.clone();
        self.append(Turn::user(message));
        self.view.clear_input();
        self.view.set_loading(true);

        self.next_request_id += 1;
        let id = RequestId(self.next_request_id);
        self.in_flight = Some(InFlight { id, handle });

        Some(PendingRequest {
            id,
            body: ChatRequest::new(message, prior),
        })
    }

    /// Finish the request `id`. Returns `false` for a stale id (stopped or
    /// abandoned request), which leaves the session untouched.
    pub fn complete(&mut self, id: RequestId, outcome: RelayOutcome) -> bool {
        match &self.in_flight {
            Some(in_flight) if in_flight.id == id => {}
            _ => return false,
        }
        self.in_flight = None;

        match outcome {
            RelayOutcome::Reply(text) if !text.is_empty() => self.append(Turn::assistant(text)),
            RelayOutcome::Reply(_) => self.view.add_message(Bubble::Ai, EMPTY_REPLY_NOTICE),
            RelayOutcome::Cancelled => self.view.add_message(Bubble::Ai, STOPPED_NOTICE),
            RelayOutcome::Failed(err) => {
                log::error!("Chat request failed: {}", err);
                self.view.add_message(Bubble::Ai, CONNECTION_ERROR_NOTICE);
            }
        }

        self.view.set_loading(false);
        true
    }

    /// Stop button / overlay close: abort and return to idle at once
    pub fn stop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
            self.view.add_message(Bubble::Ai, STOPPED_NOTICE);
        }
        self.view.set_loading(false);
    }
}
