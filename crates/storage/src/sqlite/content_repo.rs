use std::collections::HashMap;

use lesson_core::model::{AnswerOption, ContentFrame, FrameId, Question, QuestionId, SectionId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    conn, frame_columns, id_i64, map_frame_row, map_option_row, parse_question_kind,
    question_id_from_i64, question_kind_as_str, section_id_from_i64, ser,
};
use crate::repository::{ContentRepository, ContentStore, StorageError};

#[async_trait::async_trait]
impl ContentRepository for SqliteRepository {
    async fn frames_for_section(
        &self,
        section_id: SectionId,
    ) -> Result<Vec<ContentFrame>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, ord, title, kind, source_url, start_offset, end_offset, body
            FROM frames
            WHERE section_id = ?1
            ORDER BY ord ASC
            ",
        )
        .bind(id_i64("section_id", section_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_frame_row).collect()
    }

    async fn questions_for_assessment(
        &self,
        assessment_id: FrameId,
    ) -> Result<Vec<Question>, StorageError> {
        let assessment = id_i64("assessment_id", assessment_id.value())?;

        let option_rows = sqlx::query(
            r"
            SELECT question_id, id, text
            FROM question_options
            WHERE assessment_id = ?1
            ORDER BY question_id ASC, position ASC
            ",
        )
        .bind(assessment)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut options: HashMap<QuestionId, Vec<AnswerOption>> = HashMap::new();
        for row in &option_rows {
            let (question, option) = map_option_row(row)?;
            options.entry(question).or_default().push(option);
        }

        let question_rows = sqlx::query(
            r"
            SELECT id, text, kind, hint
            FROM questions
            WHERE assessment_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(assessment)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in &question_rows {
            let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
            let text: String = row.try_get("text").map_err(ser)?;
            let kind: String = row.try_get("kind").map_err(ser)?;
            let hint: Option<String> = row.try_get("hint").map_err(ser)?;
            let question = Question::new(
                id,
                text,
                parse_question_kind(&kind)?,
                options.remove(&id).unwrap_or_default(),
                hint,
            )
            .map_err(ser)?;
            questions.push(question);
        }
        Ok(questions)
    }
}

#[async_trait::async_trait]
impl ContentStore for SqliteRepository {
    async fn replace_section(
        &self,
        section_id: SectionId,
        frames: &[ContentFrame],
    ) -> Result<(), StorageError> {
        let section = id_i64("section_id", section_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for frame in frames {
            let owner = sqlx::query("SELECT section_id FROM frames WHERE id = ?1")
                .bind(id_i64("frame_id", frame.id().value())?)
                .fetch_optional(&mut *tx)
                .await
                .map_err(conn)?;
            if let Some(row) = owner {
                let owner = section_id_from_i64(row.try_get::<i64, _>("section_id").map_err(ser)?)?;
                if owner != section_id {
                    return Err(StorageError::Conflict);
                }
            }
        }

        sqlx::query("DELETE FROM frames WHERE section_id = ?1")
            .bind(section)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for frame in frames {
            let cols = frame_columns(frame);
            sqlx::query(
                r"
                INSERT INTO frames (id, section_id, ord, title, kind, source_url, start_offset, end_offset, body)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ",
            )
            .bind(id_i64("frame_id", frame.id().value())?)
            .bind(section)
            .bind(cols.ord)
            .bind(cols.title)
            .bind(cols.kind)
            .bind(cols.source_url)
            .bind(cols.start_offset)
            .bind(cols.end_offset)
            .bind(cols.body)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
                other => conn(other),
            })?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn replace_questions(
        &self,
        assessment_id: FrameId,
        questions: &[Question],
    ) -> Result<(), StorageError> {
        let assessment = id_i64("assessment_id", assessment_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM questions WHERE assessment_id = ?1")
            .bind(assessment)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, question) in questions.iter().enumerate() {
            let question_id = id_i64("question_id", question.id().value())?;
            sqlx::query(
                r"
                INSERT INTO questions (assessment_id, id, position, text, kind, hint)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(assessment)
            .bind(question_id)
            .bind(i64::try_from(position).map_err(ser)?)
            .bind(question.text())
            .bind(question_kind_as_str(question.kind()))
            .bind(question.hint())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            for (option_position, option) in question.options().iter().enumerate() {
                sqlx::query(
                    r"
                    INSERT INTO question_options (assessment_id, question_id, id, position, text)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ",
                )
                .bind(assessment)
                .bind(question_id)
                .bind(id_i64("option_id", option.id.value())?)
                .bind(i64::try_from(option_position).map_err(ser)?)
                .bind(option.text.as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
