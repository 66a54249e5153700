//! Round engine for Trivia.
//!
//! A session is a fixed sequence of rounds, one per configured question
//! type. The [`RoundCoordinator`] drives them strictly one after another;
//! within a round the [`AnswerCollector`] waits on every active player at
//! once, bounded by the round's deadline.
//!
//! # Key types
//!
//! - [`RoundCoordinator`] — READY, rounds, LEADERBOARD / FINISHED
//! - [`AnswerCollector`] — one listener task per player per round
//! - [`Round`] — a question with its immutable canonical answer
//! - [`Leaderboard`] — competition ranking and winners
//! - [`SessionState`] — lifecycle state machine
//! - [`RoundConfig`], [`Templates`] — timings and message texts

mod collector;
mod config;
mod coordinator;
mod error;
mod leaderboard;
mod round;
pub mod templates;

pub use collector::{AnswerCollector, Outcome, RoundReport};
pub use config::{RoundConfig, SessionState, Templates};
pub use coordinator::{RoundCoordinator, SessionSummary};
pub use error::RoundError;
pub use leaderboard::{Leaderboard, RankedPlayer};
pub use round::Round;
