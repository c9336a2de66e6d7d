//! Core types shared by the chat service and its clients

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned conversation identifier
pub type ConversationId = String;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Service ids arrive as integers, locally synthesized ids as strings
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default = "epoch", deserialize_with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Set on locally synthesized replies standing in for a failed request
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl Message {
    /// Create a user message
    pub fn user(id: impl Into<String>, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            content: content.into(),
            timestamp,
            is_error: false,
        }
    }

    /// Create an assistant message
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
            timestamp,
            is_error: false,
        }
    }

    /// Create an assistant message flagged as an error
    pub fn assistant_error(
        id: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(id, content, timestamp)
        }
    }
}

/// A stored conversation as listed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: ConversationId,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "epoch", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl ConversationSummary {
    const TITLE_CHARS: usize = 50;
    const PREVIEW_CHARS: usize = 80;

    /// Sidebar title: the opening message, shortened
    pub fn title(&self) -> String {
        match self.messages.first() {
            Some(first) => truncate_chars(&first.content, Self::TITLE_CHARS),
            None => "New conversation".to_string(),
        }
    }

    /// Sidebar preview: the latest message, shortened
    pub fn preview(&self) -> String {
        match self.messages.last() {
            Some(last) => truncate_chars(&last.content, Self::PREVIEW_CHARS),
            None => "No messages yet".to_string(),
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    /// `null` asks the service to open a new conversation
    pub conversation_id: Option<ConversationId>,
}

/// Response of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub message_id: String,
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub conversation_id: Option<ConversationId>,
}

/// Response of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

fn string_or_number_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(String::from)
        .filter(|id| !id.is_empty()))
}

/// Parse RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS[.fff]` taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|s| {
        let parsed = parse_timestamp(s);
        if parsed.is_none() {
            tracing::debug!("Ignoring unparseable timestamp {:?}", s);
        }
        parsed
    }))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    Ok(lenient_timestamp_opt(deserializer)?.unwrap_or_else(epoch))
}
