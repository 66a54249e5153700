//! Question provider for Trivia.
//!
//! The round engine asks a [`QuestionProvider`] for two things per round:
//! a fresh short question of a named type, and the canonical answer to
//! it. [`BuiltinQuestions`] serves the four categories a session can be
//! configured with:
//!
//! | type name | short question | answer |
//! |---|---|---|
//! | `Mathematics` | `12 + 7 - 3` | `16` |
//! | `Roman Numerals` | `MCMXCIV` | `1994` |
//! | `Usable IP Addresses of a Subnet` | `10.1.2.3/24` | `254` |
//! | `Network and Broadcast Address of a Subnet` | `10.1.2.3/24` | `10.1.2.0 and 10.1.2.255` |

mod error;
mod math;
mod roman;
mod subnet;

use std::fmt;
use std::str::FromStr;

pub use error::QuestionError;

/// Generates questions and solves them, keyed by question-type name.
///
/// Implementations must be deterministic in `solve`; `generate` may use
/// randomness.
pub trait QuestionProvider: Send + Sync + 'static {
    /// Produces a fresh short question of `question_type`.
    fn generate(&self, question_type: &str) -> Result<String, QuestionError>;

    /// Produces the canonical answer to `short_question`.
    fn solve(&self, question_type: &str, short_question: &str) -> Result<String, QuestionError>;

    /// Returns `true` if `question_type` can be generated and solved.
    fn supports(&self, question_type: &str) -> bool;
}

/// The question categories this crate knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    Mathematics,
    RomanNumerals,
    UsableAddresses,
    NetworkBroadcast,
}

impl QuestionKind {
    pub const ALL: [Self; 4] = [
        Self::Mathematics,
        Self::RomanNumerals,
        Self::UsableAddresses,
        Self::NetworkBroadcast,
    ];

    /// The name used in configuration files and QUESTION messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mathematics => "Mathematics",
            Self::RomanNumerals => "Roman Numerals",
            Self::UsableAddresses => "Usable IP Addresses of a Subnet",
            Self::NetworkBroadcast => "Network and Broadcast Address of a Subnet",
        }
    }

    /// Generates a random short question of this kind.
    pub fn generate(self) -> String {
        let mut rng = rand::rng();
        match self {
            Self::Mathematics => math::generate(&mut rng),
            Self::RomanNumerals => roman::generate(&mut rng),
            Self::UsableAddresses | Self::NetworkBroadcast => subnet::generate(&mut rng),
        }
    }

    /// Solves a short question of this kind.
    pub fn solve(self, short_question: &str) -> Result<String, QuestionError> {
        let malformed = |reason: String| QuestionError::Malformed {
            question_type: self.name().to_string(),
            question: short_question.to_string(),
            reason,
        };

        let answer = match self {
            Self::Mathematics => math::solve(short_question).map(|n| n.to_string()),
            Self::RomanNumerals => roman::solve(short_question).map(|n| n.to_string()),
            Self::UsableAddresses => {
                subnet::Subnet::parse(short_question).map(|s| s.usable_hosts().to_string())
            }
            Self::NetworkBroadcast => subnet::Subnet::parse(short_question)
                .map(|s| format!("{} and {}", s.network(), s.broadcast())),
        };
        answer.map_err(malformed)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuestionKind {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| QuestionError::UnknownType(s.to_string()))
    }
}

/// The built-in [`QuestionProvider`] backed by [`QuestionKind`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinQuestions;

impl QuestionProvider for BuiltinQuestions {
    fn generate(&self, question_type: &str) -> Result<String, QuestionError> {
        Ok(question_type.parse::<QuestionKind>()?.generate())
    }

    fn solve(&self, question_type: &str, short_question: &str) -> Result<String, QuestionError> {
        question_type.parse::<QuestionKind>()?.solve(short_question)
    }

    fn supports(&self, question_type: &str) -> bool {
        question_type.parse::<QuestionKind>().is_ok()
    }
}
