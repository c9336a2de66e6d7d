//! Scripted service for coordinator tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use parley_api::{ChatRequest, ChatResponse, ConversationSummary, Message, Result};
use tokio::sync::Notify;

use crate::service::ChatService;

/// A service that answers from queues and records what it was asked.
///
/// List calls pop from the queued results first and fall back to the fixed
/// list. Gates hold a call until the test releases it.
#[derive(Default)]
pub(crate) struct MockService {
    replies: Mutex<VecDeque<Result<ChatResponse>>>,
    lists: Mutex<VecDeque<Result<Vec<ConversationSummary>>>>,
    fixed_list: Mutex<Vec<ConversationSummary>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    listed_users: Mutex<Vec<String>>,
    chat_gate: Mutex<Option<Arc<Notify>>>,
    list_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_reply(&self, reply: Result<ChatResponse>) {
        self.replies.lock().push_back(reply);
    }

    pub(crate) fn push_list(&self, list: Result<Vec<ConversationSummary>>) {
        self.lists.lock().push_back(list);
    }

    pub(crate) fn set_list(&self, list: Vec<ConversationSummary>) {
        *self.fixed_list.lock() = list;
    }

    /// Hold every chat call until the returned notify fires once per call.
    pub(crate) fn gate_chat(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.chat_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold every list call until the returned notify fires once per call.
    pub(crate) fn gate_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().clone()
    }

    pub(crate) fn listed_users(&self) -> Vec<String> {
        self.listed_users.lock().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.listed_users.lock().len()
    }
}

#[async_trait]
impl ChatService for MockService {
    async fn post_chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat_requests.lock().push(request);
        let gate = self.chat_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(reply("done", "0", None)))
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        self.listed_users.lock().push(user_id.to_string());
        let gate = self.list_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let queued = self.lists.lock().pop_front();
        queued.unwrap_or_else(|| Ok(self.fixed_list.lock().clone()))
    }
}

pub(crate) fn reply(text: &str, message_id: &str, conversation_id: Option<&str>) -> ChatResponse {
    ChatResponse {
        response: text.to_string(),
        message_id: message_id.to_string(),
        conversation_id: conversation_id.map(str::to_string),
    }
}

pub(crate) fn conversation(id: &str, contents: &[&str]) -> ConversationSummary {
    let at = DateTime::<Utc>::UNIX_EPOCH;
    ConversationSummary {
        id: id.to_string(),
        messages: contents
            .iter()
            .enumerate()
            .map(|(i, content)| Message::user(i.to_string(), *content, at))
            .collect(),
        updated_at: at,
        user_id: None,
        session_id: None,
        created_at: None,
    }
}

pub(crate) fn service_error(detail: Option<&str>) -> parley_api::Error {
    parley_api::Error::status(500, detail.map(str::to_string))
}
