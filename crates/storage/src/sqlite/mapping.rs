use lesson_core::model::{
    AnswerOption, Article, ContentFrame, FrameBody, FrameId, OptionId, QuestionId, QuestionKind,
    SectionId, VideoSegment,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn frame_id_from_i64(v: i64) -> Result<FrameId, StorageError> {
    Ok(FrameId::new(i64_to_u64("frame_id", v)?))
}

pub(crate) fn section_id_from_i64(v: i64) -> Result<SectionId, StorageError> {
    Ok(SectionId::new(i64_to_u64("section_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn option_id_from_i64(v: i64) -> Result<OptionId, StorageError> {
    Ok(OptionId::new(i64_to_u64("option_id", v)?))
}

pub(crate) fn question_kind_as_str(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::SingleSelect => "single-select",
        QuestionKind::MultiSelect => "multi-select",
    }
}

pub(crate) fn parse_question_kind(s: &str) -> Result<QuestionKind, StorageError> {
    match s {
        "single-select" => Ok(QuestionKind::SingleSelect),
        "multi-select" => Ok(QuestionKind::MultiSelect),
        _ => Err(StorageError::Serialization(format!("invalid question kind: {s}"))),
    }
}

/// Column values for one frame row, in insert order after `id, section_id`.
pub(crate) struct FrameColumns {
    pub ord: i64,
    pub title: Option<String>,
    pub kind: &'static str,
    pub source_url: Option<String>,
    pub start_offset: Option<f64>,
    pub end_offset: Option<f64>,
    pub body: Option<String>,
}

pub(crate) fn frame_columns(frame: &ContentFrame) -> FrameColumns {
    let mut cols = FrameColumns {
        ord: i64::from(frame.order()),
        title: frame.title().map(ToOwned::to_owned),
        kind: "assessment",
        source_url: None,
        start_offset: None,
        end_offset: None,
        body: None,
    };
    match frame.body() {
        FrameBody::Video(segment) => {
            cols.kind = "video";
            cols.source_url = Some(segment.source().to_string());
            cols.start_offset = Some(segment.start_offset());
            cols.end_offset = Some(segment.end_offset());
        }
        FrameBody::Article(article) => {
            cols.kind = "article";
            cols.body = Some(article.body().to_owned());
        }
        FrameBody::Assessment => {}
    }
    cols
}

pub(crate) fn map_frame_row(row: &SqliteRow) -> Result<ContentFrame, StorageError> {
    let id = frame_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let ord: i64 = row.try_get("ord").map_err(ser)?;
    let order = u32::try_from(ord)
        .map_err(|_| StorageError::Serialization(format!("invalid ord: {ord}")))?;
    let title: Option<String> = row.try_get("title").map_err(ser)?;
    let kind: String = row.try_get("kind").map_err(ser)?;

    let body = match kind.as_str() {
        "video" => {
            let source: Option<String> = row.try_get("source_url").map_err(ser)?;
            let start: Option<f64> = row.try_get("start_offset").map_err(ser)?;
            let end: Option<f64> = row.try_get("end_offset").map_err(ser)?;
            let (Some(source), Some(start), Some(end)) = (source, start, end) else {
                return Err(StorageError::Serialization(format!(
                    "video frame {id} is missing source or offsets"
                )));
            };
            FrameBody::Video(VideoSegment::parse(&source, start, end).map_err(ser)?)
        }
        "article" => {
            let body: Option<String> = row.try_get("body").map_err(ser)?;
            FrameBody::Article(Article::new(body.unwrap_or_default()))
        }
        "assessment" => FrameBody::Assessment,
        other => {
            return Err(StorageError::Serialization(format!(
                "invalid frame kind: {other}"
            )));
        }
    };

    ContentFrame::new(id, order, title, body).map_err(ser)
}

pub(crate) fn map_option_row(row: &SqliteRow) -> Result<(QuestionId, AnswerOption), StorageError> {
    let question = question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?;
    let id = option_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let text: String = row.try_get("text").map_err(ser)?;
    Ok((question, AnswerOption::new(id, text)))
}
