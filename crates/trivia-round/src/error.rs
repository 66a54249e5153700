//! Error types for the round engine.
//!
//! Only session-fatal conditions are errors. Anything that goes wrong
//! with a single player is absorbed by the collector or the broadcast
//! and shows up as a soft removal instead.

use trivia_protocol::ProtocolError;
use trivia_questions::QuestionError;

use crate::SessionState;

/// Errors that abort a session.
#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    /// The question provider could not generate or solve a question.
    #[error("question provider failed: {0}")]
    Question(#[from] QuestionError),

    /// A server message could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A configured question type has no display format.
    #[error("no question format configured for {0:?}")]
    MissingFormat(String),

    /// The session has no rounds to play.
    #[error("no question types configured")]
    NoRounds,

    /// The coordinator attempted a transition its state machine forbids.
    #[error("invalid session transition {from} -> {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}
