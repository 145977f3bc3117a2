//! Remote grading, progress and content collaborators.

mod dto;
mod http;

use std::env;

use async_trait::async_trait;
use lesson_core::model::{
    AttemptId, CourseId, CourseInstanceId, FrameId, OptionId, QuestionId, SectionId,
};
use url::Url;

use crate::error::ServiceError;

pub use http::{HttpContentSource, HttpGradingService, HttpProgressService, RemoteClient};

//
// ─── REQUESTS / RESPONSES ──────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRequest {
    pub course_instance_id: CourseInstanceId,
    pub assessment_id: FrameId,
}

/// One graded answer for the current question of an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSubmission {
    pub attempt_id: AttemptId,
    pub question_id: QuestionId,
    pub assessment_id: FrameId,
    pub section_id: SectionId,
    pub course_id: CourseId,
    pub selected: Vec<OptionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub is_correct: bool,
    pub current_streak: Option<u32>,
}

/// Completion write for two adjacent frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub course_instance_id: CourseInstanceId,
    pub items: [FrameId; 2],
    pub cascade: bool,
}

/// Aggregates the backend reports as touched by a cascade update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressAck {
    pub section_items: Vec<FrameId>,
    pub sections: Vec<SectionId>,
}

//
// ─── SERVICE TRAITS ────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait GradingService: Send + Sync {
    /// # Errors
    ///
    /// Returns `ServiceError` on transport failures or a malformed response.
    async fn start_attempt(&self, request: &AttemptRequest) -> Result<AttemptId, ServiceError>;

    /// # Errors
    ///
    /// Returns `ServiceError` on transport failures or a malformed response.
    async fn submit_answer(&self, submission: &AnswerSubmission) -> Result<Grade, ServiceError>;
}

#[async_trait]
pub trait ProgressService: Send + Sync {
    /// # Errors
    ///
    /// Returns `ServiceError` on transport failures or a malformed response.
    async fn update_item_progress(
        &self,
        update: &ProgressUpdate,
    ) -> Result<ProgressAck, ServiceError>;
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Endpoints and credentials for the learning backend.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    /// Content API (`/course/items/`, `/assessment/questions/`).
    pub api_url: Url,
    /// Activity API (attempts, grading, progress).
    pub activity_url: Url,
    pub access_token: Option<String>,
    pub student_id: Option<String>,
}

impl RemoteConfig {
    /// Reads `LESSON_API_URL`, `LESSON_ACTIVITY_URL`, `LESSON_ACCESS_TOKEN`
    /// and `LESSON_STUDENT_ID`. Returns `None` unless both URLs parse.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_url = parse_base(&env::var("LESSON_API_URL").ok()?)?;
        let activity_url = parse_base(&env::var("LESSON_ACTIVITY_URL").ok()?)?;
        Some(Self {
            api_url,
            activity_url,
            access_token: non_blank(env::var("LESSON_ACCESS_TOKEN").ok()),
            student_id: non_blank(env::var("LESSON_STUDENT_ID").ok()),
        })
    }

    #[must_use]
    pub fn with_student(mut self, student_id: Option<String>) -> Self {
        self.student_id = non_blank(student_id);
        self
    }
}

fn parse_base(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Joining relative paths needs a trailing slash on the base.
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
