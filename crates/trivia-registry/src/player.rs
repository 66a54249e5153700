//! Player records and the copies handed out to callers.

use std::sync::Arc;

use trivia_protocol::PlayerId;

/// One registered player.
///
/// `username` never changes after registration; `score` only grows;
/// `disconnected` is set once and never cleared.
#[derive(Debug)]
pub struct Player<C> {
    /// Stable handle, equal to the player's slot index.
    pub id: PlayerId,
    /// The connection the player joined on.
    pub connection: Arc<C>,
    pub username: String,
    pub score: u32,
    /// Whether the player has an outcome in the current round.
    pub answered: bool,
    /// Tombstone: the player left, timed out of the protocol, or broke it.
    pub disconnected: bool,
}

impl<C> Player<C> {
    /// Returns `true` if the player has not been soft-removed.
    pub fn is_active(&self) -> bool {
        !self.disconnected
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot<C> {
        PlayerSnapshot {
            id: self.id,
            username: self.username.clone(),
            score: self.score,
            connection: Arc::clone(&self.connection),
        }
    }
}

/// A point-in-time copy of an active player.
///
/// Holds its own `Arc` to the connection so callers can do I/O after the
/// registry lock is released.
#[derive(Debug)]
pub struct PlayerSnapshot<C> {
    pub id: PlayerId,
    pub username: String,
    pub score: u32,
    pub connection: Arc<C>,
}

impl<C> Clone for PlayerSnapshot<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            username: self.username.clone(),
            score: self.score,
            connection: Arc::clone(&self.connection),
        }
    }
}

/// Username and score of an active player, the input to ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub username: String,
    pub score: u32,
}

impl Standing {
    pub fn new(username: impl Into<String>, score: u32) -> Self {
        Self {
            username: username.into(),
            score,
        }
    }
}
