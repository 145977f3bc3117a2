mod context;
mod frame;
mod ids;
mod penalty;
mod question;
mod selection;
mod sequence;

pub use context::LessonContext;
pub use frame::{Article, ContentFrame, FrameBody, FrameError, FrameKind, VideoSegment};
pub use ids::{
    AttemptId, AttemptIdError, CourseId, CourseInstanceId, FrameId, ModuleId, OptionId,
    ParseIdError, QuestionId, SectionId,
};
pub use penalty::PenaltyKind;
pub use question::{AnswerOption, Question, QuestionError, QuestionKind};
pub use selection::OptionSelection;
pub use sequence::{FrameSequence, SequenceError};
