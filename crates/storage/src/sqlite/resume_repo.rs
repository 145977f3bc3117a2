use lesson_core::model::SectionId;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, frame_id_from_i64, id_i64, ser};
use crate::repository::{ResumePosition, ResumeRepository, StorageError};

#[async_trait::async_trait]
impl ResumeRepository for SqliteRepository {
    async fn save_position(&self, position: &ResumePosition) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO resume_positions (section_id, frame_id, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(section_id) DO UPDATE SET
                frame_id = excluded.frame_id,
                saved_at = excluded.saved_at
            ",
        )
        .bind(id_i64("section_id", position.section_id.value())?)
        .bind(id_i64("frame_id", position.frame_id.value())?)
        .bind(position.saved_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn load_position(
        &self,
        section_id: SectionId,
    ) -> Result<Option<ResumePosition>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT frame_id, saved_at
            FROM resume_positions
            WHERE section_id = ?1
            ",
        )
        .bind(id_i64("section_id", section_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| -> Result<ResumePosition, StorageError> {
            Ok(ResumePosition {
                section_id,
                frame_id: frame_id_from_i64(row.try_get::<i64, _>("frame_id").map_err(ser)?)?,
                saved_at: row.try_get("saved_at").map_err(ser)?,
            })
        })
        .transpose()
    }

    async fn clear_position(&self, section_id: SectionId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM resume_positions WHERE section_id = ?1")
            .bind(id_i64("section_id", section_id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
