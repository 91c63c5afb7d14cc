//! Remote URL storage engine
//!
//! Catch-all for direct links to media files hosted elsewhere. The URL
//! itself is the unique id and nothing is copied; `store` only confirms the
//! record. Ordered after the embed engines so provider URLs are claimed by
//! their dedicated engine first.

use async_trait::async_trait;
use mediarack_core::models::{EngineRecord, MediaFile};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::{EngineConfig, RemoteUrlConfig};
use crate::embed::build_probe_client;
use crate::error::StorageError;
use crate::traits::{EngineClass, ParseOutcome, StorageEngine};
use crate::types::{FileMetadata, PlaybackUri, UploadSource, UriKind};
use crate::upload::kind_for_extension;

fn default_config() -> JsonValue {
    serde_json::json!({})
}

pub static REMOTE_URL: EngineClass = EngineClass {
    engine_type: "remote_url",
    label: "Remote URL",
    is_singleton: true,
    try_before: &[],
    try_after: &["local_file", "ftp", "youtube", "vimeo"],
    default_config,
};

/// Lowercased extension of the URL's path component, ignoring query and
/// fragment.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let (_, last_segment) = path.rsplit_once('/')?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub struct RemoteUrlStorage {
    id: Uuid,
    display_name: String,
    cfg: RemoteUrlConfig,
    client: reqwest::Client,
}

impl RemoteUrlStorage {
    pub fn from_record(record: &EngineRecord) -> Result<Self, StorageError> {
        let cfg = match EngineConfig::from_record(record)? {
            EngineConfig::RemoteUrl(cfg) => cfg,
            other => {
                return Err(StorageError::Config(format!(
                    "expected remote_url configuration, got '{}'",
                    other.engine_type()
                )))
            }
        };
        let client = build_probe_client(cfg.timeout_secs)?;
        Ok(RemoteUrlStorage {
            id: record.id,
            display_name: record.display_name.clone(),
            cfg,
            client,
        })
    }

    /// Best-effort HEAD request for the remote size.
    async fn probe_size(&self, url: &str) -> Option<i64> {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok()),
            Ok(response) => {
                tracing::warn!(url, status = %response.status(), "size probe returned an error status");
                None
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "size probe failed");
                None
            }
        }
    }
}

#[async_trait]
impl StorageEngine for RemoteUrlStorage {
    fn class(&self) -> &'static EngineClass {
        &REMOTE_URL
    }

    fn instance_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn parse(&self, source: &UploadSource) -> Result<ParseOutcome, StorageError> {
        let Some(url) = source.url() else {
            return Ok(ParseOutcome::Rejected);
        };
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Ok(ParseOutcome::Rejected);
        }
        let Some(ext) = url_extension(url) else {
            return Ok(ParseOutcome::Rejected);
        };
        let Some(kind) = kind_for_extension(&ext) else {
            return Ok(ParseOutcome::Rejected);
        };

        let mut meta = FileMetadata::new(kind);
        meta.unique_id = Some(url.to_string());
        meta.container = Some(ext);
        meta.display_name = Some(url.to_string());
        if self.cfg.probe_size {
            meta.size = self.probe_size(url).await;
        }

        Ok(ParseOutcome::Accepted(meta))
    }

    async fn store(
        &self,
        _file: &MediaFile,
        _source: &UploadSource,
        _meta: &FileMetadata,
    ) -> Result<Option<String>, StorageError> {
        // The asset already lives at the URL recorded during parse.
        Ok(None)
    }

    async fn delete(&self, _unique_id: &str) -> Result<bool, StorageError> {
        Ok(true)
    }

    fn playback_uris(&self, file: &MediaFile) -> Vec<PlaybackUri> {
        vec![PlaybackUri::new(UriKind::Http, file.unique_id.clone())]
    }
}
