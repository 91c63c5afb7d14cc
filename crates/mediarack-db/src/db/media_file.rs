//! Media file repository: CRUD for the media_files table.

use mediarack_core::models::{MediaFile, NewMediaFile};
use mediarack_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const FILE_COLUMNS: &str = "id, media_id, engine_id, kind, container, display_name, unique_id, \
                            size, bitrate, width, height, created_at, updated_at";

/// Repository for the media_files table.
#[derive(Clone)]
pub struct MediaFileRepository {
    pool: PgPool,
}

impl MediaFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a media file stub and return the persisted row. The row id is
    /// assigned here; engines derive storage names from it, so the insert
    /// must complete before any engine `store` call.
    #[tracing::instrument(skip(self, file), fields(db.table = "media_files", media_id = %file.media_id))]
    pub async fn create(&self, file: NewMediaFile) -> Result<MediaFile, AppError> {
        let row: MediaFile = sqlx::query_as::<Postgres, MediaFile>(&format!(
            r#"
            INSERT INTO media_files
                (id, media_id, engine_id, kind, container, display_name, unique_id,
                 size, bitrate, width, height)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(file.media_id)
        .bind(file.engine_id)
        .bind(file.kind)
        .bind(&file.container)
        .bind(&file.display_name)
        .bind(&file.unique_id)
        .bind(file.size)
        .bind(file.bitrate)
        .bind(file.width)
        .bind(file.height)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch a media file by id.
    #[tracing::instrument(skip(self), fields(db.table = "media_files", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<MediaFile>, AppError> {
        let row: Option<MediaFile> = sqlx::query_as::<Postgres, MediaFile>(&format!(
            "SELECT {} FROM media_files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// List all files attached to a media record, oldest first.
    #[tracing::instrument(skip(self), fields(db.table = "media_files", media_id = %media_id))]
    pub async fn list_for_media(&self, media_id: Uuid) -> Result<Vec<MediaFile>, AppError> {
        let rows: Vec<MediaFile> = sqlx::query_as::<Postgres, MediaFile>(&format!(
            "SELECT {} FROM media_files WHERE media_id = $1 ORDER BY created_at",
            FILE_COLUMNS
        ))
        .bind(media_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Persist the mutable fields of a media file.
    #[tracing::instrument(skip(self, file), fields(db.table = "media_files", db.record_id = %file.id))]
    pub async fn update(&self, file: &MediaFile) -> Result<(), AppError> {
        self.run_update(file, &self.pool).await
    }

    /// Persist the mutable fields within an open transaction.
    #[tracing::instrument(skip(self, file, tx), fields(db.table = "media_files", db.record_id = %file.id))]
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        file: &MediaFile,
    ) -> Result<(), AppError> {
        self.run_update(file, &mut **tx).await
    }

    async fn run_update<'e, E>(&self, file: &MediaFile, executor: E) -> Result<(), AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE media_files
            SET kind = $2,
                container = $3,
                display_name = $4,
                unique_id = $5,
                size = $6,
                bitrate = $7,
                width = $8,
                height = $9,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(file.id)
        .bind(file.kind)
        .bind(&file.container)
        .bind(&file.display_name)
        .bind(&file.unique_id)
        .bind(file.size)
        .bind(file.bitrate)
        .bind(file.width)
        .bind(file.height)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Remove a media file row.
    #[tracing::instrument(skip(self), fields(db.table = "media_files", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
