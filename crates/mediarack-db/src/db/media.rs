//! Media repository: CRUD for the media table.

use mediarack_core::models::{Media, MediaKind};
use mediarack_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const MEDIA_COLUMNS: &str =
    "id, title, description, kind, duration, thumbnail_url, created_at, updated_at";

/// Repository for the media table.
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new, empty media record and return it.
    #[tracing::instrument(skip(self), fields(db.table = "media"))]
    pub async fn create(&self, title: Option<String>) -> Result<Media, AppError> {
        let media: Media = sqlx::query_as::<Postgres, Media>(
            r#"
            INSERT INTO media (id, title)
            VALUES ($1, $2)
            RETURNING id, title, description, kind, duration, thumbnail_url, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&title)
        .fetch_one(&self.pool)
        .await?;
        Ok(media)
    }

    /// Fetch a media record by id.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let media: Option<Media> = sqlx::query_as::<Postgres, Media>(&format!(
            "SELECT {} FROM media WHERE id = $1",
            MEDIA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(media)
    }

    /// Persist the mutable presentation fields of a media record.
    #[tracing::instrument(skip(self, media), fields(db.table = "media", db.record_id = %media.id))]
    pub async fn update(&self, media: &Media) -> Result<(), AppError> {
        self.run_update(media, &self.pool).await
    }

    /// Persist the mutable fields within an open transaction.
    #[tracing::instrument(skip(self, media, tx), fields(db.table = "media", db.record_id = %media.id))]
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        media: &Media,
    ) -> Result<(), AppError> {
        self.run_update(media, &mut **tx).await
    }

    async fn run_update<'e, E>(&self, media: &Media, executor: E) -> Result<(), AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE media
            SET title = $2,
                description = $3,
                kind = $4,
                duration = $5,
                thumbnail_url = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(media.id)
        .bind(&media.title)
        .bind(&media.description)
        .bind(media.kind)
        .bind(media.duration)
        .bind(&media.thumbnail_url)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Delete a media record; its files cascade at the schema level.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List media of a given kind, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "media"))]
    pub async fn list_by_kind(&self, kind: MediaKind) -> Result<Vec<Media>, AppError> {
        let rows: Vec<Media> = sqlx::query_as::<Postgres, Media>(&format!(
            "SELECT {} FROM media WHERE kind = $1 ORDER BY created_at DESC",
            MEDIA_COLUMNS
        ))
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
