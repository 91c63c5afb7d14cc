//! Mock repository implementation for testing
//!
//! Allows testing the ingestion pipeline without database dependencies.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use mediarack_core::models::{Media, MediaFile, NewMediaFile};
use mediarack_db::IngestRepository;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory ingest repository.
#[derive(Clone)]
pub struct MockIngestRepository {
    media: Arc<Mutex<HashMap<Uuid, Media>>>,
    files: Arc<Mutex<HashMap<Uuid, MediaFile>>>,
}

impl MockIngestRepository {
    pub fn new() -> Self {
        Self {
            media: Arc::new(Mutex::new(HashMap::new())),
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn add_media(&self, media: Media) {
        self.media.lock().unwrap().insert(media.id, media);
    }

    pub fn media(&self, id: Uuid) -> Option<Media> {
        self.media.lock().unwrap().get(&id).cloned()
    }

    pub fn file(&self, id: Uuid) -> Option<MediaFile> {
        self.files.lock().unwrap().get(&id).cloned()
    }

    pub fn files_for_media(&self, media_id: Uuid) -> Vec<MediaFile> {
        self.files
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.media_id == media_id)
            .cloned()
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl Default for MockIngestRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IngestRepository for MockIngestRepository {
    async fn get_media(&self, id: Uuid) -> Result<Option<Media>> {
        Ok(self.media.lock().unwrap().get(&id).cloned())
    }

    async fn insert_media_file(&self, file: NewMediaFile) -> Result<MediaFile> {
        let now = Utc::now();
        let row = MediaFile {
            id: Uuid::new_v4(),
            media_id: file.media_id,
            engine_id: file.engine_id,
            kind: file.kind,
            container: file.container,
            display_name: file.display_name,
            unique_id: file.unique_id,
            size: file.size,
            bitrate: file.bitrate,
            width: file.width,
            height: file.height,
            created_at: now,
            updated_at: now,
        };
        self.files.lock().unwrap().insert(row.id, row.clone());
        Ok(row)
    }

    async fn flush(&self, media: &Media, file: &MediaFile) -> Result<()> {
        self.media.lock().unwrap().insert(media.id, media.clone());
        self.files.lock().unwrap().insert(file.id, file.clone());
        Ok(())
    }

    async fn delete_media_file(&self, id: Uuid) -> Result<bool> {
        Ok(self.files.lock().unwrap().remove(&id).is_some())
    }
}
