//! Session coordination: optimistic sends, conversation switching, list refresh
//!
//! Every network failure is handled exactly once, locally. There is no retry.
//!
//! Policies:
//!
//! - **Optimistic, never rolled back.** A sent message is shown before the
//!   service answers and stays in the transcript whatever happens next.
//! - **One request at a time.** `send_message` is ignored while a send or a
//!   load is in flight.
//! - **Stale replies are dropped.** Switching conversations advances the view;
//!   a reply addressed to an older view never reaches the transcript.
//! - **Stale list is acceptable.** A failed list refresh keeps the previous
//!   list and is only logged. Overlapping refreshes never go backwards: a list
//!   requested before the one already shown is dropped.
//! - **Identity changes end pending work.** Lists and loads fetched for a
//!   previous user id are dropped.

use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use parking_lot::Mutex;
use parley_api::{
    ChatClient, ChatRequest, ClientConfig, ConversationId, ConversationSummary, Message,
};
use tokio::sync::broadcast;

use crate::{
    error::Result, event::SessionEvent, handle::SessionHandle, service::ChatService,
    state::SessionState, store::SessionStore,
};

/// Content of the stand-in reply appended when a send fails
pub const SEND_FAILURE_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Error slot text after a failed conversation load
pub const LOAD_FAILURE_ERROR: &str = "Failed to load conversation";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Identity presented to the service
    pub user_id: String,
}

impl SessionConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Why a send was not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing but whitespace
    Empty,
    /// Another send or load is still in flight
    Busy,
}

/// What became of a `send_message` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply was appended
    Sent {
        conversation_id: Option<ConversationId>,
    },
    /// The request failed and the stand-in reply was appended
    Failed { detail: String },
    /// The answer arrived after the user switched conversations
    Discarded,
    /// Nothing was sent
    Ignored(IgnoreReason),
}

/// What became of a `load_conversation` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Already displayed; nothing was fetched
    Unchanged,
    /// Switched; `found` is false when the service no longer lists it
    Loaded { found: bool },
    /// Fetch failed; the error slot was set
    Failed,
    /// A later switch superseded this one
    Discarded,
}

/// Request bookkeeping, locked together with the transitions it drives.
#[derive(Debug, Default)]
struct Flight {
    /// Sends and loads awaiting the service
    requests: usize,
    /// Advanced whenever the displayed conversation changes
    view: u64,
    /// Advanced whenever a switch is requested; only the newest load applies
    switch: u64,
    /// Refreshes issued so far
    refresh_issued: u64,
    /// Ticket of the list currently shown
    refresh_applied: u64,
}

pub(crate) struct SessionInner {
    store: SessionStore,
    service: Arc<dyn ChatService>,
    flight: Mutex<Flight>,
    local_ids: AtomicU64,
}

/// The session coordinator
///
/// Cloning is cheap; clones share one state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session without contacting the service
    pub fn new(config: SessionConfig, service: Arc<dyn ChatService>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store: SessionStore::new(SessionState::new(config.user_id)),
                service,
                flight: Mutex::new(Flight::default()),
                local_ids: AtomicU64::new(0),
            }),
        }
    }

    /// Create a session and fetch its conversation list
    pub async fn start(config: SessionConfig, service: Arc<dyn ChatService>) -> Self {
        let session = Self::new(config, service);
        session.refresh_conversations().await;
        session
    }

    /// Start a session against the HTTP service
    pub async fn connect(config: SessionConfig, client: ClientConfig) -> Result<Self> {
        let client = ChatClient::new(client)?;
        Ok(Self::start(config, Arc::new(client)).await)
    }

    pub(crate) fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<SessionInner> {
        Arc::downgrade(&self.inner)
    }

    /// A weak handle for UI code; it stops working once every `Session` clone is dropped.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.downgrade())
    }

    /// Subscribe to applied state events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.store.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.inner.store.snapshot()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.store.read(|s| s.messages.clone())
    }

    pub fn conversations(&self) -> Vec<ConversationSummary> {
        self.inner.store.read(|s| s.conversations.clone())
    }

    pub fn current_conversation(&self) -> Option<ConversationId> {
        self.inner.store.read(|s| s.current_conversation.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.store.read(|s| s.is_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.inner.store.read(|s| s.error.clone())
    }

    pub fn user_id(&self) -> String {
        self.inner.store.read(|s| s.user_id.clone())
    }

    fn dispatch(&self, event: SessionEvent) {
        self.inner.store.dispatch(event);
    }

    fn next_local_id(&self) -> String {
        let seq = self.inner.local_ids.fetch_add(1, Ordering::Relaxed);
        format!("local-{}-{}", Utc::now().timestamp_millis(), seq)
    }

    fn begin_request(&self, flight: &mut Flight) {
        flight.requests += 1;
        self.dispatch(SessionEvent::SetLoading(true));
    }

    fn end_request(&self, flight: &mut Flight) {
        flight.requests = flight.requests.saturating_sub(1);
        if flight.requests == 0 {
            self.dispatch(SessionEvent::SetLoading(false));
        }
    }

    /// Send a user message and append the assistant's reply.
    ///
    /// The user message is appended before the request is made and is never
    /// retracted. On failure a flagged stand-in reply
    /// ([`SEND_FAILURE_REPLY`]) is appended instead of the real one; the error
    /// slot is left alone. After a successful exchange the conversation list is
    /// refreshed on a best-effort basis.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored(IgnoreReason::Empty);
        }

        let (view, request) = {
            let mut flight = self.inner.flight.lock();
            if flight.requests > 0 {
                tracing::debug!(
                    "Ignoring send while {} request(s) in flight",
                    flight.requests
                );
                return SendOutcome::Ignored(IgnoreReason::Busy);
            }

            let user_message = Message::user(self.next_local_id(), text, Utc::now());
            self.dispatch(SessionEvent::AppendMessage(user_message));
            self.begin_request(&mut flight);
            self.dispatch(SessionEvent::ClearError);

            let request = self.inner.store.read(|s| ChatRequest {
                message: text.to_string(),
                user_id: s.user_id.clone(),
                conversation_id: s.current_conversation.clone(),
            });
            (flight.view, request)
        };

        let result = self.inner.service.post_chat(request).await;

        let (outcome, succeeded) = {
            let mut flight = self.inner.flight.lock();
            let stale = flight.view != view;
            let succeeded = result.is_ok();

            let outcome = match result {
                Ok(_) if stale => {
                    tracing::warn!("Dropping reply for a conversation no longer displayed");
                    SendOutcome::Discarded
                }
                Err(e) if stale => {
                    tracing::warn!("Send failed after conversation switch: {}", e);
                    SendOutcome::Discarded
                }
                Ok(response) => {
                    let reply = Message::assistant(response.message_id, response.response, Utc::now());
                    self.dispatch(SessionEvent::AppendMessage(reply));
                    if let Some(ref id) = response.conversation_id {
                        self.dispatch(SessionEvent::SetCurrentConversation(Some(id.clone())));
                    }
                    SendOutcome::Sent {
                        conversation_id: response.conversation_id,
                    }
                }
                Err(e) => {
                    tracing::warn!("Error sending message: {}", e);
                    let reply =
                        Message::assistant_error(self.next_local_id(), SEND_FAILURE_REPLY, Utc::now());
                    self.dispatch(SessionEvent::AppendMessage(reply));
                    SendOutcome::Failed {
                        detail: e.user_message().to_string(),
                    }
                }
            };

            self.end_request(&mut flight);
            (outcome, succeeded)
        };

        // The service stored the exchange even if the reply was dropped
        if succeeded {
            self.refresh_conversations().await;
        }

        outcome
    }

    /// Display a stored conversation.
    ///
    /// Does nothing when `id` is already displayed, apart from superseding
    /// any load still pending. A conversation missing from the service's list
    /// is shown as empty, without an error.
    pub async fn load_conversation(&self, id: &str) -> LoadOutcome {
        let (ticket, user_id) = {
            let mut flight = self.inner.flight.lock();
            if self.inner.store.read(|s| s.is_current(id)) {
                flight.switch += 1;
                return LoadOutcome::Unchanged;
            }

            flight.switch += 1;
            self.begin_request(&mut flight);
            self.dispatch(SessionEvent::ClearError);
            (flight.switch, self.user_id())
        };

        let result = self.inner.service.list_conversations(&user_id).await;

        let mut flight = self.inner.flight.lock();
        let outcome = if flight.switch != ticket {
            tracing::debug!("Conversation {} load superseded", id);
            LoadOutcome::Discarded
        } else if self.user_id() != user_id {
            tracing::debug!("Dropping conversation {} loaded for {}", id, user_id);
            LoadOutcome::Discarded
        } else {
            match result {
                Ok(conversations) => {
                    let messages = conversations
                        .into_iter()
                        .find(|c| c.id == id)
                        .map(|c| c.messages);
                    let found = messages.is_some();
                    if !found {
                        tracing::debug!("Conversation {} is no longer listed", id);
                    }

                    flight.view += 1;
                    self.dispatch(SessionEvent::SetMessages(messages.unwrap_or_default()));
                    self.dispatch(SessionEvent::SetCurrentConversation(Some(id.to_string())));
                    LoadOutcome::Loaded { found }
                }
                Err(e) => {
                    tracing::warn!("Error loading conversation {}: {}", id, e);
                    self.dispatch(SessionEvent::SetError(LOAD_FAILURE_ERROR.to_string()));
                    LoadOutcome::Failed
                }
            }
        };

        self.end_request(&mut flight);
        outcome
    }

    /// Begin a fresh conversation; it gets an id from the first successful send.
    pub fn start_new_conversation(&self) {
        let mut flight = self.inner.flight.lock();
        flight.switch += 1;
        flight.view += 1;
        self.dispatch(SessionEvent::SetMessages(Vec::new()));
        self.dispatch(SessionEvent::SetCurrentConversation(None));
        self.dispatch(SessionEvent::ClearError);
    }

    /// Replace the conversation list with the service's current one.
    ///
    /// Returns whether the list was replaced. Failures keep the previous list.
    pub async fn refresh_conversations(&self) -> bool {
        let (ticket, user_id) = {
            let mut flight = self.inner.flight.lock();
            flight.refresh_issued += 1;
            (flight.refresh_issued, self.user_id())
        };

        match self.inner.service.list_conversations(&user_id).await {
            Ok(conversations) => {
                let mut flight = self.inner.flight.lock();
                if self.user_id() != user_id {
                    tracing::debug!("Dropping conversation list fetched for {}", user_id);
                    return false;
                }
                if ticket < flight.refresh_applied {
                    tracing::debug!("Dropping conversation list older than the one shown");
                    return false;
                }
                flight.refresh_applied = ticket;
                self.dispatch(SessionEvent::SetConversations(conversations));
                true
            }
            Err(e) => {
                tracing::warn!("Keeping stale conversation list, refresh failed: {}", e);
                false
            }
        }
    }

    /// Empty the error slot
    pub fn clear_error(&self) {
        self.dispatch(SessionEvent::ClearError);
    }

    /// Change identity and fetch that identity's conversations
    pub async fn set_user_id(&self, user_id: impl Into<String>) {
        self.dispatch(SessionEvent::SetUserId(user_id.into()));
        self.refresh_conversations().await;
    }
}
