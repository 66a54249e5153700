//! Core protocol types for the Trivia wire format.
//!
//! Every message is a flat JSON object whose `message_type` field names
//! the variant, e.g. `{"message_type": "ANSWER", "answer": "42"}`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A handle to a registered player.
///
/// Assigned by the registry at registration time and never reused within
/// a session. Usernames are not unique, so this is the only identity the
/// round engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Every message exchanged between a client and the server.
///
/// `HI`, `BYE` and `ANSWER` travel client → server; the rest travel
/// server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Client → Server: join the session under `username`.
    Hi { username: String },

    /// Client → Server: leaving the session.
    Bye,

    /// Client → Server: an answer to the current question.
    Answer { answer: String },

    /// Server → Client: the session is about to start.
    Ready { info: String },

    /// Server → Client: a new round.
    ///
    /// `trivia_question` is the display text, `short_question` the bare
    /// payload a solver works from, `time_limit` the round length in
    /// seconds.
    Question {
        question_type: String,
        trivia_question: String,
        short_question: String,
        time_limit: u64,
    },

    /// Server → Client: verdict on this client's own answer.
    Result { correct: bool, feedback: String },

    /// Server → Client: standings after a round that was not the last.
    Leaderboard { state: String },

    /// Server → Client: final standings and winner(s).
    Finished { final_standings: String },
}

impl Message {
    /// The variant tag without its fields.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Hi { .. } => MessageKind::Hi,
            Self::Bye => MessageKind::Bye,
            Self::Answer { .. } => MessageKind::Answer,
            Self::Ready { .. } => MessageKind::Ready,
            Self::Question { .. } => MessageKind::Question,
            Self::Result { .. } => MessageKind::Result,
            Self::Leaderboard { .. } => MessageKind::Leaderboard,
            Self::Finished { .. } => MessageKind::Finished,
        }
    }
}

/// The tag of a [`Message`], used for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Hi,
    Bye,
    Answer,
    Ready,
    Question,
    Result,
    Leaderboard,
    Finished,
}

impl MessageKind {
    /// Returns `true` for kinds only the server may send.
    pub fn is_client_bound(self) -> bool {
        !matches!(self, Self::Hi | Self::Bye | Self::Answer)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Hi => "HI",
            Self::Bye => "BYE",
            Self::Answer => "ANSWER",
            Self::Ready => "READY",
            Self::Question => "QUESTION",
            Self::Result => "RESULT",
            Self::Leaderboard => "LEADERBOARD",
            Self::Finished => "FINISHED",
        };
        f.write_str(tag)
    }
}
