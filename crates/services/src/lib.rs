#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod lessons;
pub mod playback;
pub mod remote;

pub use lesson_core::Clock;

pub use app_services::{AppServices, ContentMode};
pub use error::{AppServicesError, LessonError, ServiceError};
pub use lessons::{
    LessonDriver, LessonExit, LessonHandle, LessonLoopService, LessonSequencer, LessonView,
    Notice, SequencerEvent, SequencerSettings,
};
pub use playback::{PlaybackCommand, PlaybackSink, PlaybackSurface, VideoQuality};
pub use remote::{GradingService, ProgressService, RemoteConfig};
