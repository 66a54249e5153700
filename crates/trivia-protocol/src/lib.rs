//! Wire protocol for Trivia.
//!
//! This crate defines what travels between a player's client and the
//! server:
//!
//! - **Types** ([`Message`], [`MessageKind`], [`PlayerId`]) — the eight
//!   message variants and the identity type shared by the other layers.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how a message becomes
//!   the bytes of one line.
//! - **Dispatch** ([`Dispatcher`]) — decodes inbound frames and decides
//!   whether they are valid in the current phase of the session.
//!
//! ```text
//! Transport (lines) → Protocol (Message) → Registry / Round engine
//! ```

mod codec;
mod dispatch;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use dispatch::{Dispatcher, Phase, Routed};
pub use error::ProtocolError;
pub use types::{Message, MessageKind, PlayerId};
