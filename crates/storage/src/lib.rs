#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ContentRepository, ContentStore, InMemoryRepository, ResumePosition, ResumeRepository,
    Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
