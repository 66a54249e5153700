//! Round timings, message templates, and the session state machine.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::templates::render;

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Operator-supplied texts for every server message that carries prose.
///
/// Field names match the keys of the server configuration file, so the
/// struct can be flattened straight into it. See [`crate::templates`] for
/// the placeholder syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    /// READY info; `{question_interval_seconds}` is available.
    pub ready_info: String,
    /// Prefix of every trivia question, e.g. `"Question"`.
    pub question_word: String,
    /// RESULT feedback for a correct answer.
    pub correct_answer: String,
    /// RESULT feedback for a wrong answer.
    pub incorrect_answer: String,
    pub points_noun_singular: String,
    pub points_noun_plural: String,
    /// First line of the FINISHED standings.
    pub final_standings_heading: String,
    /// Winner line when one player leads; `{}` is their username.
    pub one_winner: String,
    /// Winner line on a tie; `{}` is the comma-separated usernames.
    pub multiple_winners: String,
}

impl Templates {
    /// READY info text.
    pub fn ready_info(&self, interval: Duration) -> String {
        let secs = interval.as_secs_f64().to_string();
        render(&self.ready_info, &[], &[("question_interval_seconds", &secs)])
    }

    /// RESULT feedback for `answer` against the round's `correct_answer`.
    pub fn feedback(&self, correct: bool, answer: &str, correct_answer: &str) -> String {
        let template = if correct {
            &self.correct_answer
        } else {
            &self.incorrect_answer
        };
        render(
            template,
            &[],
            &[("answer", answer), ("correct_answer", correct_answer)],
        )
    }

    /// Singular noun for exactly one point, plural otherwise (including 0).
    pub fn points_noun(&self, score: u32) -> &str {
        if score == 1 {
            &self.points_noun_singular
        } else {
            &self.points_noun_plural
        }
    }

    /// Winner line for the given winners; empty when there are none.
    pub fn winner_text(&self, winners: &[&str]) -> String {
        match winners {
            [] => String::new(),
            [one] => render(&self.one_winner, &[*one], &[]),
            many => render(&self.multiple_winners, &[many.join(", ").as_str()], &[]),
        }
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            ready_info: "Game starts in {question_interval_seconds} seconds!".into(),
            question_word: "Question".into(),
            correct_answer: "Woohoo! Great job! You got it!".into(),
            incorrect_answer: "Maybe next time :( The answer was {correct_answer}".into(),
            points_noun_singular: "point".into(),
            points_noun_plural: "points".into(),
            final_standings_heading: "Final standings:".into(),
            one_winner: "The winner is: {}".into(),
            multiple_winners: "The winners are: {}".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoundConfig
// ---------------------------------------------------------------------------

/// Everything the coordinator needs to run a session.
#[derive(Debug, Clone)]
pub struct RoundConfig {
    /// One round per entry, in order. Types may repeat.
    pub question_types: Vec<String>,

    /// Display template per question type; `{}` is the short question.
    pub question_formats: HashMap<String, String>,

    /// How long each round accepts answers.
    pub time_limit: Duration,

    /// Pause after READY and after every non-final LEADERBOARD.
    pub interval: Duration,

    /// How often the collector re-checks whether everyone has answered.
    pub poll_interval: Duration,

    /// How long the collector waits for listener tasks to wind down
    /// after the round closes.
    pub join_grace: Duration,

    pub templates: Templates,
}

impl RoundConfig {
    /// Creates a config with default timings and templates.
    pub fn new(question_types: Vec<String>, question_formats: HashMap<String, String>) -> Self {
        Self {
            question_types,
            question_formats,
            ..Self::default()
        }
    }

    /// Number of rounds the session will play.
    pub fn rounds(&self) -> usize {
        self.question_types.len()
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            question_types: Vec::new(),
            question_formats: HashMap::new(),
            time_limit: Duration::from_secs(10),
            interval: Duration::from_secs(3),
            poll_interval: Duration::from_millis(100),
            join_grace: Duration::from_secs(1),
            templates: Templates::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a game session.
///
/// ```text
/// AwaitingPlayers → Ready → RoundActive → RoundScoring ─┬→ Leaderboard → RoundActive …
///                                                       └→ Finished → Closed
/// ```
///
/// - **AwaitingPlayers**: accepting HI handshakes until the session is full.
/// - **Ready**: READY sent, waiting out the interval.
/// - **RoundActive**: QUESTION sent, collecting answers.
/// - **RoundScoring**: round closed, computing standings.
/// - **Leaderboard**: standings sent, waiting out the interval.
/// - **Finished**: FINISHED sent after the last round.
/// - **Closed**: every connection closed. Terminal.
///
/// Any non-terminal state may also jump straight to `Closed` when the
/// session has to be torn down early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    AwaitingPlayers,
    Ready,
    RoundActive,
    RoundScoring,
    Leaderboard,
    Finished,
    Closed,
}

impl SessionState {
    /// The regular successor of this state.
    ///
    /// `RoundScoring` has two successors; this returns `Leaderboard`, and
    /// the coordinator picks `Finished` after the last round.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AwaitingPlayers => Some(Self::Ready),
            Self::Ready => Some(Self::RoundActive),
            Self::RoundActive => Some(Self::RoundScoring),
            Self::RoundScoring => Some(Self::Leaderboard),
            Self::Leaderboard => Some(Self::RoundActive),
            Self::Finished => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Closed, _) => false,
            (_, Self::Closed) => true,
            (Self::RoundScoring, Self::Finished) => true,
            _ => self.next() == Some(target),
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingPlayers => write!(f, "AwaitingPlayers"),
            Self::Ready => write!(f, "Ready"),
            Self::RoundActive => write!(f, "RoundActive"),
            Self::RoundScoring => write!(f, "RoundScoring"),
            Self::Leaderboard => write!(f, "Leaderboard"),
            Self::Finished => write!(f, "Finished"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_next_follows_round_cycle() {
        assert_eq!(SessionState::AwaitingPlayers.next(), Some(SessionState::Ready));
        assert_eq!(SessionState::Ready.next(), Some(SessionState::RoundActive));
        assert_eq!(SessionState::RoundActive.next(), Some(SessionState::RoundScoring));
        assert_eq!(SessionState::RoundScoring.next(), Some(SessionState::Leaderboard));
        assert_eq!(SessionState::Leaderboard.next(), Some(SessionState::RoundActive));
        assert_eq!(SessionState::Finished.next(), Some(SessionState::Closed));
        assert_eq!(SessionState::Closed.next(), None);
    }

    #[test]
    fn test_session_state_scoring_may_finish() {
        assert!(SessionState::RoundScoring.can_transition_to(SessionState::Finished));
        assert!(!SessionState::Leaderboard.can_transition_to(SessionState::Finished));
    }

    #[test]
    fn test_session_state_rejects_skips() {
        assert!(!SessionState::AwaitingPlayers.can_transition_to(SessionState::RoundActive));
        assert!(!SessionState::Ready.can_transition_to(SessionState::RoundScoring));
        assert!(!SessionState::RoundActive.can_transition_to(SessionState::Leaderboard));
        assert!(!SessionState::Finished.can_transition_to(SessionState::RoundActive));
    }

    #[test]
    fn test_session_state_any_live_state_may_close() {
        assert!(SessionState::AwaitingPlayers.can_transition_to(SessionState::Closed));
        assert!(SessionState::RoundActive.can_transition_to(SessionState::Closed));
        assert!(SessionState::Finished.can_transition_to(SessionState::Closed));
        assert!(!SessionState::Closed.can_transition_to(SessionState::Closed));
    }

    #[test]
    fn test_templates_points_noun_singular_only_for_one() {
        let t = Templates::default();
        assert_eq!(t.points_noun(0), "points");
        assert_eq!(t.points_noun(1), "point");
        assert_eq!(t.points_noun(2), "points");
    }

    #[test]
    fn test_templates_feedback_substitutes_answers() {
        let t = Templates {
            incorrect_answer: "{answer} is wrong, it was {correct_answer}".into(),
            ..Templates::default()
        };
        assert_eq!(t.feedback(false, "41", "42"), "41 is wrong, it was 42");
        assert_eq!(t.feedback(true, "42", "42"), t.correct_answer);
    }

    #[test]
    fn test_templates_winner_text() {
        let t = Templates {
            one_winner: "Winner: {}".into(),
            multiple_winners: "Winners: {}".into(),
            ..Templates::default()
        };
        assert_eq!(t.winner_text(&[]), "");
        assert_eq!(t.winner_text(&["alice"]), "Winner: alice");
        assert_eq!(t.winner_text(&["alice", "bob"]), "Winners: alice, bob");
    }

    #[test]
    fn test_templates_ready_info_renders_seconds() {
        let t = Templates::default();
        assert_eq!(
            t.ready_info(Duration::from_secs(2)),
            "Game starts in 2 seconds!"
        );
        assert_eq!(
            t.ready_info(Duration::from_millis(500)),
            "Game starts in 0.5 seconds!"
        );
    }

    #[test]
    fn test_templates_deserialize_from_config_keys() {
        let json = r#"{
            "ready_info": "r", "question_word": "Q", "correct_answer": "c",
            "incorrect_answer": "i", "points_noun_singular": "pt",
            "points_noun_plural": "pts", "final_standings_heading": "h",
            "one_winner": "w {}", "multiple_winners": "ws {}"
        }"#;
        let t: Templates = serde_json::from_str(json).unwrap();
        assert_eq!(t.question_word, "Q");
        assert_eq!(t.points_noun(3), "pts");
    }
}
