//! Session state: displayed messages, conversation list, loading and error slots.

use parley_api::{ConversationId, ConversationSummary, Message};
use serde::{Deserialize, Serialize};

/// Everything a chat UI renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Messages of the conversation currently displayed
    pub messages: Vec<Message>,
    /// Conversations as listed by the service, in service order
    pub conversations: Vec<ConversationSummary>,
    /// `None` while a fresh conversation has not been saved yet
    pub current_conversation: Option<ConversationId>,
    /// Whether a send or conversation load is in flight
    pub is_loading: bool,
    /// Last user-facing error
    pub error: Option<String>,
    /// Opaque identity presented to the service
    pub user_id: String,
}

impl SessionState {
    /// Empty state for the given identity
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            conversations: Vec::new(),
            current_conversation: None,
            is_loading: false,
            error: None,
            user_id: user_id.into(),
        }
    }

    /// Look up a listed conversation
    pub fn conversation(&self, id: &str) -> Option<&ConversationSummary> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Whether `id` names the conversation currently displayed
    pub fn is_current(&self, id: &str) -> bool {
        self.current_conversation.as_deref() == Some(id)
    }
}
