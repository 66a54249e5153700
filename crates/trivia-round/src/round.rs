use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use trivia_protocol::Message;
use trivia_questions::QuestionProvider;

use crate::templates::render;
use crate::{RoundConfig, RoundError};

/// One question of a session.
///
/// The canonical answer is computed once when the round is prepared and
/// never changes afterwards; the round's listeners share one copy of it.
#[derive(Debug, Clone)]
pub struct Round {
    /// 1-based position in the session.
    pub number: u32,
    pub question_type: String,
    /// Raw question as produced by the provider.
    pub short_question: String,
    /// `"<question_word> <number> (<question_type>):\n<formatted question>"`.
    pub trivia_question: String,
    pub time_limit: Duration,
    /// Answers arriving at or after this instant are not scored.
    pub deadline: Instant,
    answer: Arc<str>,
}

impl Round {
    /// Generates and solves the question for round `number` and opens it
    /// with a deadline `config.time_limit` from now.
    pub fn prepare<Q: QuestionProvider + ?Sized>(
        number: u32,
        question_type: &str,
        provider: &Q,
        config: &RoundConfig,
    ) -> Result<Self, RoundError> {
        let format = config
            .question_formats
            .get(question_type)
            .ok_or_else(|| RoundError::MissingFormat(question_type.to_string()))?;

        let short_question = provider.generate(question_type)?;
        let answer = provider.solve(question_type, &short_question)?;

        let formatted = render(format, &[short_question.as_str()], &[]);
        let trivia_question = format!(
            "{} {} ({}):\n{}",
            config.templates.question_word, number, question_type, formatted
        );

        Ok(Self {
            number,
            question_type: question_type.to_string(),
            short_question,
            trivia_question,
            time_limit: config.time_limit,
            deadline: Instant::now() + config.time_limit,
            answer: answer.into(),
        })
    }

    /// The canonical answer.
    pub fn answer(&self) -> &Arc<str> {
        &self.answer
    }

    /// Answers must match the canonical answer exactly.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == &*self.answer
    }

    /// The QUESTION message announcing this round.
    pub fn question_message(&self) -> Message {
        Message::Question {
            question_type: self.question_type.clone(),
            trivia_question: self.trivia_question.clone(),
            short_question: self.short_question.clone(),
            time_limit: self.time_limit.as_secs(),
        }
    }
}
