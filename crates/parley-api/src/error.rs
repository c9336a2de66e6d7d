//! Error types for parley-api

use thiserror::Error;

/// Result type alias using parley-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when the service did not explain a failed send.
pub const FALLBACK_SEND_ERROR: &str = "Failed to send message";

/// Errors that can occur when talking to the chat service
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service answered with a non-success status
    #[error("Service returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a status error
    pub fn status(status: u16, detail: Option<String>) -> Self {
        Self::Status { status, detail }
    }

    /// The service-provided `detail`, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text suitable for showing to a user: the service detail verbatim
    /// when present, otherwise a fixed fallback.
    pub fn user_message(&self) -> &str {
        self.detail().unwrap_or(FALLBACK_SEND_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_uses_detail_verbatim() {
        let e = Error::status(500, Some("Internal server error".into()));
        assert_eq!(e.user_message(), "Internal server error");
    }

    #[test]
    fn test_user_message_fallback_without_detail() {
        let e = Error::status(502, None);
        assert_eq!(e.user_message(), FALLBACK_SEND_ERROR);
        assert_eq!(
            Error::InvalidConfig("bad url".into()).user_message(),
            FALLBACK_SEND_ERROR
        );
    }

    #[test]
    fn test_status_display() {
        let e = Error::status(404, Some("Not found".into()));
        assert_eq!(e.to_string(), "Service returned 404: Not found");
        let e = Error::status(500, None);
        assert_eq!(e.to_string(), "Service returned 500: no detail");
    }
}
