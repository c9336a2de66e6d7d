//! Service abstraction the coordinator talks through

use async_trait::async_trait;
use parley_api::{ChatClient, ChatRequest, ChatResponse, ConversationSummary, Result};

/// The remote operations a session needs
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Post a user message and receive the assistant reply
    async fn post_chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// List every conversation stored for a user, newest first
    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>>;
}

/// Direct HTTP service
#[async_trait]
impl ChatService for ChatClient {
    async fn post_chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.send_message(&request).await
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        ChatClient::list_conversations(self, user_id).await
    }
}
