//! Error types for parley-session

use thiserror::Error;

/// Result type alias using parley-session Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the session layer
///
/// Network failures during send/load/refresh are absorbed into session
/// state and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// An error building the service client
    #[error(transparent)]
    Api(#[from] parley_api::Error),

    /// A handle was used after its session was dropped
    #[error("session handle used outside of a live session")]
    Detached,
}
