//! Player registry for Trivia.
//!
//! Tracks every player who joined the session together with the
//! connection they joined on and their per-session state (score,
//! answered flag, disconnected flag).
//!
//! 1. **Admission** — [`validate_username`] and capacity checks in
//!    [`PlayerRegistry::register`]
//! 2. **Round bookkeeping** — [`PlayerRegistry::begin_round`] and
//!    [`PlayerRegistry::record_answer`]
//! 3. **Soft removal** — [`PlayerRegistry::mark_disconnected`]; entries
//!    are never deleted, so ids and iteration order stay stable
//!
//! # How it fits in the stack
//!
//! ```text
//! Round engine (above)  ← snapshots players, records answers
//!     ↕
//! Registry (this crate)  ← owns player state and connection handles
//!     ↕
//! Protocol (below)  ← provides PlayerId
//! ```

mod auth;
mod error;
mod player;
mod registry;

pub use auth::{MAX_USERNAME_LEN, validate_username};
pub use error::RegistryError;
pub use player::{Player, PlayerSnapshot, Standing};
pub use registry::{PlayerRegistry, SharedRegistry};
