//! Wire shapes of the learning backend and their validation into domain types.

use lesson_core::model::{
    AnswerOption, Article, AttemptId, ContentFrame, FrameBody, FrameId, OptionId, Question,
    QuestionId, QuestionKind, SectionId, VideoSegment,
};
use serde::{Deserialize, Serialize};

use super::{AnswerSubmission, AttemptRequest, Grade, ProgressAck, ProgressUpdate};
use crate::error::ServiceError;

fn invalid(msg: impl Into<String>) -> ServiceError {
    ServiceError::InvalidPayload(msg.into())
}

/// Ids arrive as numbers or numeric strings depending on the endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }

    fn into_u64(self, field: &str) -> Result<u64, ServiceError> {
        match self {
            WireId::Number(n) => Ok(n),
            WireId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| invalid(format!("{field} is not numeric: {s}"))),
        }
    }
}

//
// ─── ATTEMPTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartAssessmentBody<'a> {
    course_instance_id: String,
    assessment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<&'a str>,
}

impl<'a> StartAssessmentBody<'a> {
    pub(crate) fn new(request: &AttemptRequest, student_id: Option<&'a str>) -> Self {
        Self {
            course_instance_id: request.course_instance_id.to_string(),
            assessment_id: request.assessment_id.to_string(),
            student_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartAssessmentResponse {
    attempt_id: Option<WireId>,
}

impl StartAssessmentResponse {
    pub(crate) fn into_attempt_id(self) -> Result<AttemptId, ServiceError> {
        let raw = self
            .attempt_id
            .ok_or_else(|| invalid("no attemptId received"))?
            .into_string();
        AttemptId::new(raw).map_err(|e| invalid(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitAssessmentBody<'a> {
    assessment_id: u64,
    section_id: u64,
    course_id: u64,
    attempt_id: &'a str,
    question_id: u64,
    answers: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<&'a str>,
}

impl<'a> SubmitAssessmentBody<'a> {
    pub(crate) fn new(submission: &'a AnswerSubmission, student_id: Option<&'a str>) -> Self {
        Self {
            assessment_id: submission.assessment_id.value(),
            section_id: submission.section_id.value(),
            course_id: submission.course_id.value(),
            attempt_id: submission.attempt_id.as_str(),
            question_id: submission.question_id.value(),
            answers: submission.selected.iter().map(OptionId::value).collect(),
            student_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitAssessmentResponse {
    is_answer_correct: bool,
    #[serde(default)]
    current_streak: Option<u32>,
}

impl From<SubmitAssessmentResponse> for Grade {
    fn from(value: SubmitAssessmentResponse) -> Self {
        Self {
            is_correct: value.is_answer_correct,
            current_streak: value.current_streak,
        }
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProgressBody<'a> {
    course_instance_id: String,
    section_item_id: Vec<String>,
    cascade: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<&'a str>,
}

impl<'a> UpdateProgressBody<'a> {
    pub(crate) fn new(update: &ProgressUpdate, student_id: Option<&'a str>) -> Self {
        Self {
            course_instance_id: update.course_instance_id.to_string(),
            section_item_id: update.items.iter().map(ToString::to_string).collect(),
            cascade: update.cascade,
            student_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressEntry {
    #[serde(default)]
    section_items: Vec<WireId>,
    #[serde(default)]
    sections: Vec<WireId>,
}

pub(crate) fn progress_ack(entries: Vec<ProgressEntry>) -> Result<ProgressAck, ServiceError> {
    let mut ack = ProgressAck::default();
    for entry in entries {
        for id in entry.section_items {
            ack.section_items
                .push(FrameId::new(id.into_u64("sectionItems")?));
        }
        for id in entry.sections {
            ack.sections.push(SectionId::new(id.into_u64("sections")?));
        }
    }
    Ok(ack)
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// `/course/items/` answers with a bare list or an `items` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { items: Vec<T> },
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { items } => items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemDto {
    id: u64,
    item_type: String,
    #[serde(default)]
    sequence: Option<u32>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    start_time: Option<f64>,
    #[serde(default)]
    end_time: Option<f64>,
}

impl ItemDto {
    /// `position` is the 0-based list position, used when `sequence` is absent.
    pub(crate) fn into_frame(self, position: usize) -> Result<ContentFrame, ServiceError> {
        let id = FrameId::new(self.id);
        let body = match self.item_type.to_ascii_lowercase().as_str() {
            "video" => {
                let source = self
                    .source
                    .ok_or_else(|| invalid(format!("video item {id} has no source")))?;
                let segment = VideoSegment::parse(
                    &source,
                    self.start_time.unwrap_or(0.0),
                    self.end_time
                        .ok_or_else(|| invalid(format!("video item {id} has no end_time")))?,
                )
                .map_err(|e| invalid(format!("video item {id}: {e}")))?;
                FrameBody::Video(segment)
            }
            "article" => FrameBody::Article(Article::new(self.content.unwrap_or_default())),
            "assessment" => FrameBody::Assessment,
            other => return Err(invalid(format!("item {id} has unknown type {other}"))),
        };
        let order = match self.sequence {
            Some(sequence) => sequence,
            None => u32::try_from(position + 1)
                .map_err(|_| invalid("too many items in section"))?,
        };
        ContentFrame::new(id, order, self.title, body)
            .map_err(|e| invalid(format!("item {id}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OptionDto {
    id: u64,
    option_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionDto {
    id: u64,
    text: String,
    #[serde(default)]
    options: Vec<OptionDto>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl TryFrom<QuestionDto> for Question {
    type Error = ServiceError;

    fn try_from(value: QuestionDto) -> Result<Self, Self::Error> {
        let kind = match value.kind.as_deref() {
            Some("multi-select") => QuestionKind::MultiSelect,
            _ => QuestionKind::SingleSelect,
        };
        let options = value
            .options
            .into_iter()
            .map(|o| AnswerOption::new(OptionId::new(o.id), o.option_text))
            .collect();
        Question::new(QuestionId::new(value.id), value.text, kind, options, value.hint)
            .map_err(|e| invalid(e.to_string()))
    }
}
