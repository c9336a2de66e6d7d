//! Session events: the only way session state changes

use parley_api::{ConversationId, ConversationSummary, Message};
use serde::{Deserialize, Serialize};

/// Transitions applied to [`SessionState`](crate::SessionState)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Replace the displayed messages
    SetMessages(Vec<Message>),

    /// Append one message to the displayed messages
    AppendMessage(Message),

    /// Set the loading flag
    SetLoading(bool),

    /// Replace the conversation list wholesale
    SetConversations(Vec<ConversationSummary>),

    /// Point at a conversation, or at a fresh unsaved one
    SetCurrentConversation(Option<ConversationId>),

    /// Fill the error slot
    SetError(String),

    /// Empty the error slot
    ClearError,

    /// Replace the session identity
    SetUserId(String),

    /// Any tag this version does not know; applying it changes nothing
    #[serde(other)]
    Unknown,
}

impl SessionEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SetMessages(_) => "set_messages",
            SessionEvent::AppendMessage(_) => "append_message",
            SessionEvent::SetLoading(_) => "set_loading",
            SessionEvent::SetConversations(_) => "set_conversations",
            SessionEvent::SetCurrentConversation(_) => "set_current_conversation",
            SessionEvent::SetError(_) => "set_error",
            SessionEvent::ClearError => "clear_error",
            SessionEvent::SetUserId(_) => "set_user_id",
            SessionEvent::Unknown => "unknown",
        }
    }
}
