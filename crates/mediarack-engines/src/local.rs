//! Local filesystem storage engine

use async_trait::async_trait;
use mediarack_core::models::{MediaFile, MediaKind};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::{EngineConfig, LocalFileConfig};
use crate::error::StorageError;
use crate::traits::{EngineClass, ParseOutcome, StorageEngine};
use crate::types::{FileMetadata, PlaybackUri, UploadSource, UriKind};
use crate::upload::{parse_file_upload, sanitize_display_name};

fn default_config() -> JsonValue {
    serde_json::json!({ "path": "data/media" })
}

pub static LOCAL_FILE: EngineClass = EngineClass {
    engine_type: "local_file",
    label: "Local File Storage",
    is_singleton: true,
    try_before: &[],
    try_after: &[],
    default_config,
};

/// Stores uploaded files under a configured directory. The on-disk name is
/// derived from the media file's id, so the stub row must be flushed before
/// `store` runs.
pub struct LocalFileStorage {
    id: Uuid,
    display_name: String,
    cfg: LocalFileConfig,
}

impl LocalFileStorage {
    pub fn from_record(
        record: &mediarack_core::models::EngineRecord,
    ) -> Result<Self, StorageError> {
        let cfg = match EngineConfig::from_record(record)? {
            EngineConfig::LocalFile(cfg) => cfg,
            other => {
                return Err(StorageError::Config(format!(
                    "expected local_file configuration, got '{}'",
                    other.engine_type()
                )))
            }
        };
        Ok(LocalFileStorage {
            id: record.id,
            display_name: record.display_name.clone(),
            cfg,
        })
    }

    /// On-disk name for a media file: `{id}-{sanitized display name}` with
    /// the container extension guaranteed present.
    fn storage_name(file: &MediaFile) -> String {
        let safe = sanitize_display_name(&file.display_name);
        let suffix = format!(".{}", file.container);
        if file.container.is_empty() || safe.to_ascii_lowercase().ends_with(&suffix) {
            format!("{}-{}", file.id, safe)
        } else {
            format!("{}-{}{}", file.id, safe, suffix)
        }
    }

    /// Resolve a stored unique id to a filesystem path, refusing anything
    /// that could escape the storage directory.
    fn resolve(&self, unique_id: &str) -> Result<PathBuf, StorageError> {
        if unique_id.is_empty()
            || unique_id.contains("..")
            || unique_id.contains('/')
            || unique_id.contains('\\')
        {
            return Err(StorageError::Internal(anyhow::anyhow!(
                "storage key '{}' escapes the storage directory",
                unique_id
            )));
        }
        Ok(Path::new(&self.cfg.path).join(unique_id))
    }
}

#[async_trait]
impl StorageEngine for LocalFileStorage {
    fn class(&self) -> &'static EngineClass {
        &LOCAL_FILE
    }

    fn instance_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn parse(&self, source: &UploadSource) -> Result<ParseOutcome, StorageError> {
        Ok(parse_file_upload(source))
    }

    async fn store(
        &self,
        file: &MediaFile,
        source: &UploadSource,
        _meta: &FileMetadata,
    ) -> Result<Option<String>, StorageError> {
        let upload = source.file().ok_or_else(|| {
            StorageError::Store("local storage requires an uploaded file".to_string())
        })?;

        let name = Self::storage_name(file);
        let path = self.resolve(&name)?;

        fs::create_dir_all(&self.cfg.path).await.map_err(|e| {
            StorageError::Store(format!(
                "failed to create storage directory {}: {}",
                self.cfg.path, e
            ))
        })?;

        let mut out = fs::File::create(&path).await.map_err(|e| {
            StorageError::Store(format!("failed to create file {}: {}", path.display(), e))
        })?;
        out.write_all(&upload.data).await.map_err(|e| {
            StorageError::Store(format!("failed to write file {}: {}", path.display(), e))
        })?;
        out.sync_all().await.map_err(|e| {
            StorageError::Store(format!("failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = upload.data.len(),
            "stored media file locally"
        );

        Ok(Some(name))
    }

    async fn delete(&self, unique_id: &str) -> Result<bool, StorageError> {
        let path = self.resolve(unique_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Delete(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn playback_uris(&self, file: &MediaFile) -> Vec<PlaybackUri> {
        let mut uris = Vec::new();
        if let Some(base) = &self.cfg.base_url {
            uris.push(PlaybackUri::new(
                UriKind::Http,
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    urlencoding::encode(&file.unique_id)
                ),
            ));
        }
        if file.kind == MediaKind::Video {
            if let Some(rtmp) = &self.cfg.rtmp_server_uri {
                uris.push(PlaybackUri::new(
                    UriKind::Rtmp,
                    format!("{}/{}", rtmp.trim_end_matches('/'), file.unique_id),
                ));
            }
        }
        let path = Path::new(&self.cfg.path).join(&file.unique_id);
        uris.push(PlaybackUri::new(
            UriKind::File,
            format!("file://{}", path.display()),
        ));
        uris
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UploadedFile;
    use chrono::Utc;
    use mediarack_core::models::EngineRecord;

    fn engine(path: &str) -> LocalFileStorage {
        let record = EngineRecord::new(
            Uuid::new_v4(),
            "local_file",
            "Local",
            true,
            serde_json::json!({
                "path": path,
                "base_url": "http://localhost:8080/media"
            }),
        );
        LocalFileStorage::from_record(&record).unwrap()
    }

    fn media_file(display_name: &str, container: &str) -> MediaFile {
        let now = Utc::now();
        MediaFile {
            id: Uuid::new_v4(),
            media_id: Uuid::new_v4(),
            engine_id: Uuid::new_v4(),
            kind: MediaKind::Audio,
            container: container.to_string(),
            display_name: display_name.to_string(),
            unique_id: String::new(),
            size: None,
            bitrate: None,
            width: None,
            height: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn source_with_file(filename: &str, data: &[u8]) -> UploadSource {
        UploadSource::new(
            Some(UploadedFile {
                filename: filename.to_string(),
                content_type: "audio/mpeg".to_string(),
                data: data.to_vec(),
            }),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_writes_id_prefixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path().to_str().unwrap());
        let file = media_file("track.mp3", "mp3");
        let source = source_with_file("track.mp3", b"bytes");
        let meta = FileMetadata::new(MediaKind::Audio);

        let unique_id = engine.store(&file, &source, &meta).await.unwrap().unwrap();
        assert_eq!(unique_id, format!("{}-track.mp3", file.id));

        let written = std::fs::read(dir.path().join(&unique_id)).unwrap();
        assert_eq!(written, b"bytes");
    }

    #[tokio::test]
    async fn test_store_appends_missing_container_extension() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path().to_str().unwrap());
        let file = media_file("track", "mp3");
        let source = source_with_file("track", b"x");
        let meta = FileMetadata::new(MediaKind::Audio);

        let unique_id = engine.store(&file, &source, &meta).await.unwrap().unwrap();
        assert!(unique_id.ends_with(".mp3"));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path().to_str().unwrap());
        let file = media_file("track.mp3", "mp3");
        let source = source_with_file("track.mp3", b"bytes");
        let meta = FileMetadata::new(MediaKind::Audio);

        let unique_id = engine.store(&file, &source, &meta).await.unwrap().unwrap();
        assert!(engine.delete(&unique_id).await.unwrap());
        assert!(!engine.delete(&unique_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path().to_str().unwrap());
        assert!(engine.delete("../etc/passwd").await.is_err());
        assert!(engine.delete("a/b.mp3").await.is_err());
    }

    #[test]
    fn test_playback_uris_include_http_and_file() {
        let engine = engine("/var/lib/mediarack");
        let mut file = media_file("track.mp3", "mp3");
        file.unique_id = "abc-track.mp3".to_string();

        let uris = engine.playback_uris(&file);
        assert_eq!(uris.len(), 2);
        assert_eq!(uris[0].kind, UriKind::Http);
        assert_eq!(uris[0].uri, "http://localhost:8080/media/abc-track.mp3");
        assert_eq!(uris[1].kind, UriKind::File);
    }

    #[tokio::test]
    async fn test_parse_delegates_to_upload_base() {
        let engine = engine("/var/lib/mediarack");
        let accepted = engine
            .parse(&source_with_file("a.mp3", b"x"))
            .await
            .unwrap();
        assert!(matches!(accepted, ParseOutcome::Accepted(_)));

        let url_only =
            UploadSource::new(None, Some("https://example.com/watch?v=1".to_string())).unwrap();
        let rejected = engine.parse(&url_only).await.unwrap();
        assert!(matches!(rejected, ParseOutcome::Rejected));
    }
}
