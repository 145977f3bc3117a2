use lesson_core::model::{FrameId, PenaltyKind};

use super::event::EntryToken;
use crate::playback::PlaybackCommand;
use crate::remote::{AnswerSubmission, AttemptRequest, ProgressUpdate};

/// Side effects requested by the sequencer, executed in order by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEffect {
    Playback(PlaybackCommand),
    StartPlaybackPoll(EntryToken),
    StopPlaybackPoll,
    StartCountdown(EntryToken),
    StopCountdown,
    LoadQuestions {
        token: EntryToken,
        assessment_id: FrameId,
    },
    StartAttempt {
        token: EntryToken,
        request: AttemptRequest,
    },
    SubmitAnswer {
        token: EntryToken,
        submission: AnswerSubmission,
    },
    /// Fire-and-forget; failure only produces a notice.
    RecordProgress(ProgressUpdate),
    SaveResume(FrameId),
    ClearResume,
    Notify(Notice),
    SectionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AttemptStarted,
    AttemptStartFailed(String),
    QuestionsUnavailable,
    IncorrectAnswer,
    CorrectAnswer,
    SubmitFailed(String),
    ProgressFailed(String),
    Penalty(PenaltyKind),
    StreakUpdated(u32),
    SectionCompleted,
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Notice::AttemptStarted => "Assessment started successfully!".into(),
            Notice::AttemptStartFailed(reason) => {
                format!("Failed to start the assessment: {reason}")
            }
            Notice::QuestionsUnavailable => "No assessment data available.".into(),
            Notice::IncorrectAnswer => "Incorrect Answer! The segment will now run again.".into(),
            Notice::CorrectAnswer => "Correct Answer! Moving to the next segment !".into(),
            Notice::SubmitFailed(reason) => format!("Failed to submit the answer: {reason}"),
            Notice::ProgressFailed(reason) => format!("Failed to update progress: {reason}"),
            Notice::Penalty(kind) => kind.message().into(),
            Notice::StreakUpdated(streak) => format!("Current streak: {streak}"),
            Notice::SectionCompleted => "Section complete!".into(),
        }
    }

    #[must_use]
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::AttemptStarted | Notice::CorrectAnswer | Notice::SectionCompleted => {
                NoticeLevel::Success
            }
            Notice::StreakUpdated(_) => NoticeLevel::Info,
            Notice::IncorrectAnswer | Notice::Penalty(_) | Notice::QuestionsUnavailable => {
                NoticeLevel::Warning
            }
            Notice::AttemptStartFailed(_) | Notice::SubmitFailed(_) | Notice::ProgressFailed(_) => {
                NoticeLevel::Error
            }
        }
    }

    /// Streak updates feed a counter rather than a toast.
    #[must_use]
    pub fn is_toast(&self) -> bool {
        !matches!(self, Notice::StreakUpdated(_))
    }
}
