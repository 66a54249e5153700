//! Error types for the registry.

use trivia_protocol::PlayerId;

/// Errors that can occur while admitting or looking up players.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The username is empty, too long, or not purely alphanumeric.
    #[error("invalid username {0:?}")]
    InvalidUsername(String),

    /// Every player slot of the session is taken.
    #[error("session is full ({0} players)")]
    SessionFull(usize),

    /// No player was ever registered under this id.
    #[error("player {0} not found")]
    NotFound(PlayerId),
}
