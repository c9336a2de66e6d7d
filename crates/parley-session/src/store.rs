//! Session store: the pure transition function and the state holder built on it

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{event::SessionEvent, state::SessionState};

/// Apply one event to a state, producing the next state.
///
/// Total and side-effect free: every event yields a state, and events this
/// version does not understand return the input unchanged.
pub fn apply(state: SessionState, event: SessionEvent) -> SessionState {
    match event {
        SessionEvent::SetMessages(messages) => SessionState { messages, ..state },
        SessionEvent::AppendMessage(message) => {
            let mut messages = state.messages;
            messages.push(message);
            SessionState { messages, ..state }
        }
        SessionEvent::SetLoading(is_loading) => SessionState { is_loading, ..state },
        SessionEvent::SetConversations(conversations) => SessionState {
            conversations,
            ..state
        },
        SessionEvent::SetCurrentConversation(current_conversation) => SessionState {
            current_conversation,
            ..state
        },
        SessionEvent::SetError(error) => SessionState {
            error: Some(error),
            ..state
        },
        SessionEvent::ClearError => SessionState {
            error: None,
            ..state
        },
        SessionEvent::SetUserId(user_id) => SessionState { user_id, ..state },
        SessionEvent::Unknown => state,
    }
}

/// Holds the session state and publishes every applied event.
pub struct SessionStore {
    state: Mutex<SessionState>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(initial: SessionState) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            state: Mutex::new(initial),
            event_tx,
        }
    }

    /// Apply an event atomically, then notify subscribers
    pub fn dispatch(&self, event: SessionEvent) {
        tracing::trace!("dispatch {}", event.name());
        {
            let mut state = self.state.lock();
            let current = std::mem::replace(&mut *state, SessionState::new(String::new()));
            *state = apply(current, event.clone());
        }
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Read the current state without cloning all of it
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Subscribe to applied events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }
}
