use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::{ContentFrame, FrameId, Question, SectionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Last frame a learner reached in a section.
///
/// Stored by frame id rather than index so a reordered section still resumes
/// on the same frame (or falls back to the start if the frame is gone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePosition {
    pub section_id: SectionId,
    pub frame_id: FrameId,
    pub saved_at: DateTime<Utc>,
}

/// Read side of lesson content: frames per section, questions per assessment.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Frames of a section in no particular order. An unknown section yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn frames_for_section(
        &self,
        section_id: SectionId,
    ) -> Result<Vec<ContentFrame>, StorageError>;

    /// Questions for an assessment frame, in display order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn questions_for_assessment(
        &self,
        assessment_id: FrameId,
    ) -> Result<Vec<Question>, StorageError>;
}

/// Write side for local content backends (seeding, offline copies).
#[async_trait]
pub trait ContentStore: ContentRepository {
    /// Replace every frame of `section_id` with `frames`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when a frame id already belongs to a
    /// different section, or other storage errors.
    async fn replace_section(
        &self,
        section_id: SectionId,
        frames: &[ContentFrame],
    ) -> Result<(), StorageError>;

    /// Replace the question list of an assessment frame.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn replace_questions(
        &self,
        assessment_id: FrameId,
        questions: &[Question],
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn save_position(&self, position: &ResumePosition) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn load_position(
        &self,
        section_id: SectionId,
    ) -> Result<Option<ResumePosition>, StorageError>;

    /// Clearing a section with no saved position is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_position(&self, section_id: SectionId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sections: Arc<Mutex<HashMap<SectionId, Vec<ContentFrame>>>>,
    questions: Arc<Mutex<HashMap<FrameId, Vec<Question>>>>,
    positions: Arc<Mutex<HashMap<SectionId, ResumePosition>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn frames_for_section(
        &self,
        section_id: SectionId,
    ) -> Result<Vec<ContentFrame>, StorageError> {
        let guard = self.sections.lock().map_err(poisoned)?;
        Ok(guard.get(&section_id).cloned().unwrap_or_default())
    }

    async fn questions_for_assessment(
        &self,
        assessment_id: FrameId,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard.get(&assessment_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ContentStore for InMemoryRepository {
    async fn replace_section(
        &self,
        section_id: SectionId,
        frames: &[ContentFrame],
    ) -> Result<(), StorageError> {
        let mut guard = self.sections.lock().map_err(poisoned)?;
        let taken = guard
            .iter()
            .filter(|(id, _)| **id != section_id)
            .flat_map(|(_, existing)| existing.iter())
            .any(|existing| frames.iter().any(|f| f.id() == existing.id()));
        if taken {
            return Err(StorageError::Conflict);
        }
        guard.insert(section_id, frames.to_vec());
        Ok(())
    }

    async fn replace_questions(
        &self,
        assessment_id: FrameId,
        questions: &[Question],
    ) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(assessment_id, questions.to_vec());
        Ok(())
    }
}

#[async_trait]
impl ResumeRepository for InMemoryRepository {
    async fn save_position(&self, position: &ResumePosition) -> Result<(), StorageError> {
        let mut guard = self.positions.lock().map_err(poisoned)?;
        guard.insert(position.section_id, position.clone());
        Ok(())
    }

    async fn load_position(
        &self,
        section_id: SectionId,
    ) -> Result<Option<ResumePosition>, StorageError> {
        let guard = self.positions.lock().map_err(poisoned)?;
        Ok(guard.get(&section_id).cloned())
    }

    async fn clear_position(&self, section_id: SectionId) -> Result<(), StorageError> {
        let mut guard = self.positions.lock().map_err(poisoned)?;
        guard.remove(&section_id);
        Ok(())
    }
}

/// Aggregates content and resume repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentRepository>,
    pub resume: Arc<dyn ResumeRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_memory(InMemoryRepository::new())
    }

    /// Wrap an already-populated in-memory repository.
    #[must_use]
    pub fn from_memory(repo: InMemoryRepository) -> Self {
        let content: Arc<dyn ContentRepository> = Arc::new(repo.clone());
        let resume: Arc<dyn ResumeRepository> = Arc::new(repo);
        Self { content, resume }
    }

    /// Keep the resume backend but read content elsewhere (e.g. a remote API).
    #[must_use]
    pub fn with_content(mut self, content: Arc<dyn ContentRepository>) -> Self {
        self.content = content;
        self
    }
}
