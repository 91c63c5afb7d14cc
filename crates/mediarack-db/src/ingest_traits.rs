//! Repository trait abstraction for the ingestion pipeline
//!
//! The pipeline is written against this minimal interface so it can be tested
//! with in-memory repositories, without a database.

use anyhow::Result;
use async_trait::async_trait;
use mediarack_core::models::{Media, MediaFile, NewMediaFile};
use mediarack_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::media::MediaRepository;
use crate::db::media_file::MediaFileRepository;
use crate::db::transaction::with_transaction;

/// Persistence operations the ingestion pipeline needs.
#[async_trait]
pub trait IngestRepository: Send + Sync {
    /// Fetch the owning media record.
    async fn get_media(&self, id: Uuid) -> Result<Option<Media>>;

    /// Insert a media file stub so it receives its primary key. Engines
    /// derive storage names from the id, so this must complete before
    /// `store` runs.
    async fn insert_media_file(&self, file: NewMediaFile) -> Result<MediaFile>;

    /// Persist all accumulated ingestion changes to the media record and the
    /// file in one step.
    async fn flush(&self, media: &Media, file: &MediaFile) -> Result<()>;

    /// Remove a media file row (stub cleanup after a failed ingestion).
    async fn delete_media_file(&self, id: Uuid) -> Result<bool>;
}

/// Database-backed implementation composing the sqlx repositories. The flush
/// step runs both updates inside one transaction.
#[derive(Clone)]
pub struct DbIngestRepository {
    media: MediaRepository,
    files: MediaFileRepository,
    pool: PgPool,
}

impl DbIngestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            media: MediaRepository::new(pool.clone()),
            files: MediaFileRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl IngestRepository for DbIngestRepository {
    async fn get_media(&self, id: Uuid) -> Result<Option<Media>> {
        self.media
            .get(id)
            .await
            .map_err(|e: AppError| anyhow::anyhow!(e))
    }

    async fn insert_media_file(&self, file: NewMediaFile) -> Result<MediaFile> {
        self.files
            .create(file)
            .await
            .map_err(|e: AppError| anyhow::anyhow!(e))
    }

    async fn flush(&self, media: &Media, file: &MediaFile) -> Result<()> {
        let media_repo = self.media.clone();
        let file_repo = self.files.clone();
        with_transaction(&self.pool, |tx| {
            let media = media.clone();
            let file = file.clone();
            Box::pin(async move {
                media_repo.update_tx(tx, &media).await?;
                file_repo.update_tx(tx, &file).await?;
                Ok::<_, AppError>(())
            })
        })
        .await
    }

    async fn delete_media_file(&self, id: Uuid) -> Result<bool> {
        self.files
            .delete(id)
            .await
            .map_err(|e: AppError| anyhow::anyhow!(e))
    }
}
