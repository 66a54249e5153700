/// Errors from generating or solving a question.
#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    /// No category is registered under this name.
    #[error("unknown question type {0:?}")]
    UnknownType(String),

    /// The short question could not be parsed for its category.
    #[error("malformed {question_type} question {question:?}: {reason}")]
    Malformed {
        question_type: String,
        question: String,
        reason: String,
    },
}
