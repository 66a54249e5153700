//! The player registry: every player of the session, by stable handle.
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is NOT thread-safe by itself. The server shares it as
//! a [`SharedRegistry`] (`Arc<Mutex<_>>`) and every caller follows one
//! rule: lock, mutate or copy, unlock, and only then touch a connection.
//! No method here performs I/O, so holding the guard is always short.

use std::sync::Arc;

use tokio::sync::Mutex;
use trivia_protocol::PlayerId;

use crate::{Player, PlayerSnapshot, RegistryError, Standing, validate_username};

/// The registry as shared between the coordinator and listener tasks.
pub type SharedRegistry<C> = Arc<Mutex<PlayerRegistry<C>>>;

/// Tracks all joined players and their per-session state.
///
/// ## Lifecycle of an entry
///
/// ```text
/// register() ──→ [active] ──→ mark_disconnected() ──→ [tombstoned]
///                   │  ↑                                    │
///      begin_round()│  │record_answer()                     │
///                   └──┘                   kept until session end
/// ```
///
/// Entries live in an append-only vector and a [`PlayerId`] is the index
/// of its entry, so ids stay valid and iteration order is stable for the
/// whole session.
pub struct PlayerRegistry<C> {
    players: Vec<Player<C>>,
    capacity: usize,
    /// Round whose answers may currently be recorded.
    current_round: Option<u32>,
}

impl<C> PlayerRegistry<C> {
    /// Creates an empty registry admitting at most `capacity` players.
    pub fn new(capacity: usize) -> Self {
        Self {
            players: Vec::with_capacity(capacity),
            capacity,
            current_round: None,
        }
    }

    /// Creates an empty registry already wrapped for sharing.
    pub fn shared(capacity: usize) -> SharedRegistry<C> {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Admits a player.
    ///
    /// The caller keeps its own clone of `connection` so that it can close
    /// the connection when admission fails.
    ///
    /// # Errors
    /// - [`RegistryError::InvalidUsername`] — not purely alphanumeric
    /// - [`RegistryError::SessionFull`] — every slot is taken
    pub fn register(
        &mut self,
        connection: Arc<C>,
        username: &str,
    ) -> Result<PlayerId, RegistryError> {
        validate_username(username)?;
        if self.is_full() {
            return Err(RegistryError::SessionFull(self.capacity));
        }

        let id = PlayerId(self.players.len() as u64);
        self.players.push(Player {
            id,
            connection,
            username: username.to_string(),
            score: 0,
            answered: false,
            disconnected: false,
        });

        tracing::info!(%id, username, "player registered");
        Ok(id)
    }

    /// Soft-removes a player.
    ///
    /// A removed player also counts as answered, so a round in progress
    /// stops waiting on them. Returns `true` if this call changed the
    /// player's state; calling it again is a no-op returning `false`.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] for an id that was never issued.
    pub fn mark_disconnected(&mut self, id: PlayerId) -> Result<bool, RegistryError> {
        let player = self.slot_mut(id).ok_or(RegistryError::NotFound(id))?;

        if player.disconnected {
            return Ok(false);
        }
        player.disconnected = true;
        player.answered = true;

        tracing::info!(%id, username = %player.username, "player soft-removed");
        Ok(true)
    }

    /// Copies every active player, in registration order.
    pub fn snapshot_active(&self) -> Vec<PlayerSnapshot<C>> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(Player::snapshot)
            .collect()
    }

    /// Opens `round` for answers: clears every answered flag, makes
    /// `round` the only round [`record_answer`](Self::record_answer)
    /// accepts, and returns the active players at this instant.
    pub fn begin_round(&mut self, round: u32) -> Vec<PlayerSnapshot<C>> {
        self.current_round = Some(round);
        for player in &mut self.players {
            player.answered = player.disconnected;
        }
        self.snapshot_active()
    }

    /// Stops accepting answers until the next [`begin_round`](Self::begin_round).
    pub fn close_round(&mut self) {
        self.current_round = None;
    }

    /// The round currently accepting answers, if any.
    pub fn current_round(&self) -> Option<u32> {
        self.current_round
    }

    /// Records one player's answer to `round`.
    ///
    /// Marks the player answered and adds a point when `correct`. Returns
    /// the new score, or `None` without touching anything when the player
    /// is unknown or removed, has already answered, or `round` is no
    /// longer the current round.
    pub fn record_answer(&mut self, id: PlayerId, round: u32, correct: bool) -> Option<u32> {
        if self.current_round != Some(round) {
            tracing::warn!(%id, round, current = ?self.current_round, "answer for a stale round dropped");
            return None;
        }

        let player = self.slot_mut(id)?;
        if player.disconnected || player.answered {
            return None;
        }

        player.answered = true;
        if correct {
            player.score += 1;
        }
        Some(player.score)
    }

    /// Counts the players in `ids` that are still active and have not
    /// answered.
    pub fn unanswered_among(&self, ids: &[PlayerId]) -> usize {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .filter(|p| p.is_active() && !p.answered)
            .count()
    }

    /// Username and score of every active player, in registration order.
    pub fn standings(&self) -> Vec<Standing> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| Standing::new(p.username.clone(), p.score))
            .collect()
    }

    /// Looks up a player, active or not.
    pub fn get(&self, id: PlayerId) -> Option<&Player<C>> {
        usize::try_from(id.0).ok().and_then(|i| self.players.get(i))
    }

    /// Every connection ever registered, for closing at session end.
    pub fn connections(&self) -> Vec<Arc<C>> {
        self.players
            .iter()
            .map(|p| Arc::clone(&p.connection))
            .collect()
    }

    /// Number of registered players, removed ones included.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody has registered yet.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Number of players not soft-removed.
    pub fn active_len(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` once every slot has been taken.
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.capacity
    }

    fn slot_mut(&mut self, id: PlayerId) -> Option<&mut Player<C>> {
        usize::try_from(id.0).ok().and_then(|i| self.players.get_mut(i))
    }
}

// =========================================================================
// Tests
// =========================================================================
