use lesson_core::model::{AttemptId, FrameSequence, OptionId, PenaltyKind, Question};

use crate::error::{LessonError, ServiceError};
use crate::remote::{Grade, ProgressAck};

/// Identity of one frame entry.
///
/// Bumped on every entry, including re-entry of the same index. Timer ticks
/// and service completions carry the token they were issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntryToken(u64);

impl EntryToken {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Player states reported through the state-change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Ended,
    Buffering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStep {
    Previous,
    Next,
}

/// Everything the sequencer reacts to.
#[derive(Debug)]
pub enum SequencerEvent {
    /// Content is available; enter the frame at `start_index`.
    Activate {
        frames: FrameSequence,
        start_index: usize,
    },

    // ─── user ───
    OptionToggled(OptionId),
    SubmitRequested,
    NextRequested,
    BackRequested,
    QuestionNavigated(QuestionStep),
    RetryAttemptStart,
    PlayPauseRequested,

    // ─── collaborators ───
    PenaltyRaised(PenaltyKind),
    PlaybackReady,
    PlaybackStateChanged(PlaybackState),

    // ─── timers ───
    PlaybackTime { token: EntryToken, secs: f64 },
    CountdownTick(EntryToken),

    // ─── completions ───
    QuestionsLoaded {
        token: EntryToken,
        result: Result<Vec<Question>, LessonError>,
    },
    AttemptStarted {
        token: EntryToken,
        result: Result<AttemptId, ServiceError>,
    },
    AnswerGraded {
        token: EntryToken,
        result: Result<Grade, ServiceError>,
    },
    ProgressRecorded(Result<ProgressAck, ServiceError>),

    Teardown,
}
