//! A cloneable, weak handle for UI code.

use std::sync::Weak;

use tokio::sync::broadcast;

use crate::{
    error::{Error, Result},
    event::SessionEvent,
    session::{LoadOutcome, SendOutcome, Session, SessionInner},
    state::SessionState,
};

/// Gives presentation code access to a session without owning it.
///
/// Every call fails with [`Error::Detached`] once the session is gone;
/// nothing is silently skipped.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Weak<SessionInner>,
}

impl SessionHandle {
    pub(crate) fn new(inner: Weak<SessionInner>) -> Self {
        Self { inner }
    }

    fn session(&self) -> Result<Session> {
        self.inner
            .upgrade()
            .map(Session::from_inner)
            .ok_or(Error::Detached)
    }

    /// Whether the session is still alive
    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn snapshot(&self) -> Result<SessionState> {
        Ok(self.session()?.snapshot())
    }

    pub fn subscribe(&self) -> Result<broadcast::Receiver<SessionEvent>> {
        Ok(self.session()?.subscribe())
    }

    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        Ok(self.session()?.send_message(text).await)
    }

    pub async fn load_conversation(&self, id: &str) -> Result<LoadOutcome> {
        Ok(self.session()?.load_conversation(id).await)
    }

    pub fn start_new_conversation(&self) -> Result<()> {
        self.session()?.start_new_conversation();
        Ok(())
    }

    pub async fn refresh_conversations(&self) -> Result<bool> {
        Ok(self.session()?.refresh_conversations().await)
    }

    pub fn clear_error(&self) -> Result<()> {
        self.session()?.clear_error();
        Ok(())
    }

    pub async fn set_user_id(&self, user_id: impl Into<String>) -> Result<()> {
        self.session()?.set_user_id(user_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::testing::{MockService, reply};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_handle_drives_live_session() {
        let service = Arc::new(MockService::new());
        service.push_reply(Ok(reply("hey", "1", Some("3"))));
        let session = Session::new(SessionConfig::new("user_test"), service);
        let handle = session.handle();

        assert!(handle.is_attached());
        let outcome = handle.send_message("hi").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Sent { .. }));
        assert_eq!(handle.snapshot().unwrap().messages.len(), 2);
        assert_eq!(session.messages().len(), 2);

        handle.start_new_conversation().unwrap();
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_handle_fails_fast_after_session_dropped() {
        let service = Arc::new(MockService::new());
        let session = Session::new(SessionConfig::new("user_test"), service.clone());
        let handle = session.handle();
        drop(session);

        assert!(!handle.is_attached());
        assert!(matches!(handle.snapshot(), Err(Error::Detached)));
        assert!(matches!(handle.send_message("hi").await, Err(Error::Detached)));
        assert!(matches!(handle.load_conversation("1").await, Err(Error::Detached)));
        assert!(matches!(handle.start_new_conversation(), Err(Error::Detached)));
        assert!(matches!(handle.refresh_conversations().await, Err(Error::Detached)));
        assert!(matches!(handle.clear_error(), Err(Error::Detached)));
        assert!(matches!(handle.set_user_id("x").await, Err(Error::Detached)));
        assert!(matches!(handle.subscribe(), Err(Error::Detached)));
        assert!(service.chat_requests().is_empty());
    }
}
