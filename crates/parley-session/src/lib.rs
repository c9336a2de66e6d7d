//! parley-session: chat session state and coordination
//!
//! This crate keeps a client's view of a chat consistent while messages
//! travel to and from the chat service: a pure transition function over
//! [`SessionState`], a store that applies it, and a [`Session`] that sequences
//! requests against those transitions.

pub mod error;
pub mod event;
pub mod handle;
pub mod service;
pub mod session;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use event::SessionEvent;
pub use handle::SessionHandle;
pub use service::ChatService;
pub use session::{
    IgnoreReason, LOAD_FAILURE_ERROR, LoadOutcome, SEND_FAILURE_REPLY, SendOutcome, Session,
    SessionConfig,
};
pub use state::SessionState;
pub use store::{SessionStore, apply};
