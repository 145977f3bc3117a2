//! Lesson sequencing: the pure state machine and the async driver around it.

mod attempt;
mod driver;
mod effect;
mod event;
mod sequencer;
mod view;
mod workflow;

pub use attempt::{AssessmentAttempt, SubmitRejected};
pub use driver::{LessonCollaborators, LessonDriver, LessonExit, LessonHandle};
pub use effect::{Notice, NoticeLevel, SequencerEffect};
pub use event::{EntryToken, PlaybackState, QuestionStep, SequencerEvent};
pub use sequencer::{ActiveTimers, LessonSequencer, SequencerSettings, SequencerState};
pub use view::{AssessmentView, FrameView, LessonView};
pub use workflow::LessonLoopService;
