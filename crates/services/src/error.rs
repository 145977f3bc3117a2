//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::SequenceError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Failures talking to the remote grading, progress or content endpoints.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("remote services are not configured")]
    Disabled,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Errors emitted while opening a lesson.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson data unavailable: {0}")]
    DataUnavailable(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
