use thiserror::Error;

use crate::model::{AttemptIdError, FrameError, QuestionError, SequenceError};

/// Umbrella for domain validation failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    AttemptId(#[from] AttemptIdError),
}
