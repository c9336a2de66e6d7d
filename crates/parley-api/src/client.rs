//! HTTP client for the chat service

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::{Error, Result},
    types::{ChatRequest, ChatResponse, ConversationSummary, HealthStatus},
};

/// Used when neither explicit configuration nor the environment names a service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable consulted by [`ClientConfig::from_env`]
pub const BASE_URL_ENV: &str = "PARLEY_API_URL";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base address, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Resolve the base address from `PARLEY_API_URL`, else the local default
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::default().with_base_url(url),
            _ => Self::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Chat service client
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ChatClient {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let trimmed = config.base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| Error::InvalidConfig(format!("invalid base URL {:?}: {}", trimmed, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "base URL {:?} cannot carry a path",
                trimmed
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Create a client configured from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// The service base address
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `POST /api/chat`
    pub async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(&["api", "chat"])?;
        tracing::debug!(
            "POST {} (conversation: {:?})",
            url,
            request.conversation_id
        );

        let response = self.http.post(url).json(request).send().await?;
        decode(response).await
    }

    /// `GET /api/conversations/{user_id}`
    pub async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        let url = self.endpoint(&["api", "conversations", user_id])?;
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    /// `GET /api/health`
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    /// Join path segments onto the base address, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.detail)
            .and_then(|detail| detail.as_str().map(str::to_string));
        return Err(Error::status(status.as_u16(), detail));
    }

    Ok(serde_json::from_str(&text)?)
}
