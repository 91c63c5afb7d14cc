//! Media ingestion pipeline
//!
//! `add_new_media_file` runs the full sequence for one incoming file or
//! URL: parse → stub persistence → store → metadata backfill → thumbnail →
//! flush → post-process → transcode. Engines are tried strictly in the
//! order produced by `sort_engines`; exactly one engine ends up owning the
//! resulting media file.

use std::sync::Arc;

use mediarack_core::models::{Media, MediaFile, MediaKind, NewMediaFile};
use mediarack_db::IngestRepository;
use mediarack_engines::{
    FileMetadata, ParseOutcome, StorageEngine, StorageError, ThumbSource, TranscodeOutcome,
    UploadSource, UploadedFile,
};
use uuid::Uuid;

use crate::thumbnail::{ThumbnailError, Thumbnailer};

/// Copy parsed metadata onto the parent media record, only where the
/// corresponding field is still unset. Operator-entered values are never
/// overwritten.
pub fn backfill_media(media: &mut Media, meta: &FileMetadata) {
    fn unset(value: &Option<String>) -> bool {
        value.as_deref().map_or(true, |v| v.trim().is_empty())
    }

    if media.duration.is_none() {
        media.duration = meta.duration;
    }
    if unset(&media.title) && meta.title.is_some() {
        media.title = meta.title.clone();
    }
    if unset(&media.description) && meta.description.is_some() {
        media.description = meta.description.clone();
    }
    if media.kind.is_none() {
        // Supplementary tracks never define what the media itself is.
        match meta.kind {
            MediaKind::Audio | MediaKind::Video => media.kind = Some(meta.kind),
            MediaKind::AudioDescription | MediaKind::Captions => {}
        }
    }
}

fn new_media_file(
    media_id: Uuid,
    engine_id: Uuid,
    meta: &FileMetadata,
    source: &UploadSource,
) -> NewMediaFile {
    let display_name = meta
        .display_name
        .clone()
        .or_else(|| source.file().map(|f| f.filename.clone()))
        .or_else(|| source.url().map(|u| u.to_string()))
        .unwrap_or_else(|| "file".to_string());

    NewMediaFile {
        media_id,
        engine_id,
        kind: meta.kind,
        container: meta.container.clone().unwrap_or_default(),
        display_name,
        unique_id: meta.unique_id.clone().unwrap_or_default(),
        size: meta.size.or_else(|| source.file().map(|f| f.size())),
        bitrate: meta.bitrate,
        width: meta.width,
        height: meta.height,
    }
}

/// The ingestion service. Holds the ordered engine list plus the
/// persistence and thumbnail collaborators.
pub struct MediaIngest {
    engines: Vec<Arc<dyn StorageEngine>>,
    repo: Arc<dyn IngestRepository>,
    thumbnailer: Arc<dyn Thumbnailer>,
}

impl MediaIngest {
    pub fn new(
        engines: Vec<Arc<dyn StorageEngine>>,
        repo: Arc<dyn IngestRepository>,
        thumbnailer: Arc<dyn Thumbnailer>,
    ) -> Self {
        MediaIngest {
            engines,
            repo,
            thumbnailer,
        }
    }

    /// The enabled engines in attempt order, for callers that need playback
    /// URIs or engine listings.
    pub fn engines(&self) -> &[Arc<dyn StorageEngine>] {
        &self.engines
    }

    /// Ingest one file or URL onto the given media record.
    ///
    /// Fails with a user-safe [`StorageError::User`] when no engine accepts
    /// the input; any other error is a backend failure and propagates after
    /// the stub row has been cleaned up.
    pub async fn add_new_media_file(
        &self,
        media_id: Uuid,
        file: Option<UploadedFile>,
        url: Option<String>,
    ) -> Result<MediaFile, StorageError> {
        let source = UploadSource::new(file, url)?;
        let mut media = self
            .repo
            .get_media(media_id)
            .await?
            .ok_or_else(|| {
                StorageError::Internal(anyhow::anyhow!("media {} does not exist", media_id))
            })?;

        // Parse phase: first engine that accepts wins; rejections are the
        // expected chain-of-responsibility signal.
        let mut winner: Option<(Arc<dyn StorageEngine>, FileMetadata)> = None;
        for engine in &self.engines {
            match engine.parse(&source).await? {
                ParseOutcome::Accepted(meta) => {
                    tracing::debug!(
                        engine_type = engine.class().engine_type,
                        engine_id = %engine.instance_id(),
                        "engine accepted input"
                    );
                    winner = Some((engine.clone(), meta));
                    break;
                }
                ParseOutcome::Rejected => {
                    tracing::debug!(
                        engine_type = engine.class().engine_type,
                        "engine rejected input"
                    );
                }
            }
        }
        let Some((engine, meta)) = winner else {
            return Err(unusable_input_error(&source));
        };

        // Stub persistence: engines derive storage names from the row id,
        // so the insert must complete before `store` runs.
        let mut media_file = self
            .repo
            .insert_media_file(new_media_file(media_id, engine.instance_id(), &meta, &source))
            .await?;

        let mut stored = false;
        if let Err(err) = self
            .run_post_stub(&engine, &source, &meta, &mut media_file, &mut media, &mut stored)
            .await
        {
            self.cleanup_failed_ingest(engine.as_ref(), &media_file, stored)
                .await;
            return Err(err);
        }

        // Transcode phase: ask every engine in order, independently of the
        // owner; the first acceptor wins and all-declined is normal.
        for candidate in &self.engines {
            match candidate.transcode(&media_file).await? {
                TranscodeOutcome::Accepted => {
                    tracing::info!(
                        engine_type = candidate.class().engine_type,
                        media_file_id = %media_file.id,
                        "engine accepted transcoding"
                    );
                    break;
                }
                TranscodeOutcome::Declined => {}
            }
        }

        Ok(media_file)
    }

    async fn run_post_stub(
        &self,
        engine: &Arc<dyn StorageEngine>,
        source: &UploadSource,
        meta: &FileMetadata,
        media_file: &mut MediaFile,
        media: &mut Media,
        stored: &mut bool,
    ) -> Result<(), StorageError> {
        // Store phase
        let returned = engine.store(media_file, source, meta).await?;
        *stored = true;
        if let Some(unique_id) = returned {
            media_file.unique_id = unique_id;
        }
        if media_file.unique_id.is_empty() {
            return Err(StorageError::Internal(anyhow::anyhow!(
                "engine '{}' produced no unique id for media file {}",
                engine.class().engine_type,
                media_file.id
            )));
        }

        // Backfill phase
        backfill_media(media, meta);

        // Thumbnail phase: best-effort for remote fetches, fatal when
        // generation itself fails. Skipped when the media already has a
        // distinct thumbnail.
        if let Some(thumb) = &meta.thumbnail {
            if media.thumbnail_url.is_none() {
                match self.materialize_thumbnail(media, thumb).await {
                    Ok(Some(locator)) => media.thumbnail_url = Some(locator),
                    Ok(None) => {}
                    Err(ThumbnailError::Fetch(msg)) => {
                        tracing::warn!(
                            media_id = %media.id,
                            error = %msg,
                            "could not fetch thumbnail, continuing without one"
                        );
                    }
                    Err(err @ ThumbnailError::Generate(_)) => {
                        return Err(StorageError::Internal(anyhow::Error::new(err)));
                    }
                }
            }
        }

        // Flush all accumulated changes
        self.repo.flush(media, media_file).await?;

        // Post-process on the winning engine only
        engine.postprocess(media_file).await?;

        Ok(())
    }

    async fn materialize_thumbnail(
        &self,
        media: &Media,
        thumb: &ThumbSource,
    ) -> Result<Option<String>, ThumbnailError> {
        match thumb {
            ThumbSource::Url(url) => self.thumbnailer.create_from_url(media, url).await,
            ThumbSource::Bytes(data) => self.thumbnailer.create_from_bytes(media, data).await,
        }
    }

    /// Best-effort removal of everything this call created, so a failed
    /// ingestion leaves no addressable media file behind.
    async fn cleanup_failed_ingest(
        &self,
        engine: &dyn StorageEngine,
        media_file: &MediaFile,
        stored: bool,
    ) {
        if stored && !media_file.unique_id.is_empty() {
            if let Err(err) = engine.delete(&media_file.unique_id).await {
                tracing::warn!(
                    engine_type = engine.class().engine_type,
                    unique_id = %media_file.unique_id,
                    error = %err,
                    "failed to remove stored asset while cleaning up"
                );
            }
        }
        if let Err(err) = self.repo.delete_media_file(media_file.id).await {
            tracing::warn!(
                media_file_id = %media_file.id,
                error = %err,
                "failed to remove media file stub while cleaning up"
            );
        }
    }
}

fn unusable_input_error(source: &UploadSource) -> StorageError {
    if let Some(file) = source.file() {
        if let Some(ext) = file.extension() {
            return StorageError::User(format!(
                "The file extension '.{}' is not supported.",
                ext
            ));
        }
        return StorageError::User(
            "The uploaded file has no usable file extension.".to_string(),
        );
    }
    StorageError::User("The given URL cannot be played.".to_string())
}
