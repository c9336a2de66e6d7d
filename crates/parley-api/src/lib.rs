//! parley-api: client for the parley chat service
//!
//! This crate provides the wire types and a thin HTTP client for the two
//! endpoints a chat session needs: posting a message and listing a user's
//! conversations.

pub mod client;
pub mod error;
pub mod types;

pub use client::{BASE_URL_ENV, ChatClient, ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use types::*;
