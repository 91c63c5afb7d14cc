//! Vimeo embed engine

use async_trait::async_trait;
use mediarack_core::models::{EngineRecord, MediaFile, MediaKind};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::config::{EmbedConfig, EngineConfig};
use crate::embed::{apply_oembed, build_probe_client, capture_video_id, fetch_oembed};
use crate::error::StorageError;
use crate::traits::{EngineClass, ParseOutcome, StorageEngine};
use crate::types::{FileMetadata, PlaybackUri, UploadSource, UriKind};

const DEFAULT_OEMBED_ENDPOINT: &str = "https://vimeo.com/api/oembed.json";

fn default_config() -> JsonValue {
    serde_json::json!({})
}

pub static VIMEO: EngineClass = EngineClass {
    engine_type: "vimeo",
    label: "Vimeo",
    is_singleton: true,
    try_before: &[],
    try_after: &["local_file", "ftp"],
    default_config,
};

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(
                r"^https?://(?:www\.)?vimeo\.com/(?:video/|channels/[^/]+/|groups/[^/]+/videos/)?(\d+)",
            )
            .expect("valid pattern"),
            Regex::new(r"^https?://player\.vimeo\.com/video/(\d+)").expect("valid pattern"),
        ]
    })
}

/// Extract the numeric video id from any supported Vimeo URL shape.
pub fn extract_video_id(url: &str) -> Option<String> {
    capture_video_id(patterns(), url.trim())
}

pub struct VimeoStorage {
    id: Uuid,
    display_name: String,
    cfg: EmbedConfig,
    client: reqwest::Client,
}

impl VimeoStorage {
    pub fn from_record(record: &EngineRecord) -> Result<Self, StorageError> {
        let cfg = match EngineConfig::from_record(record)? {
            EngineConfig::Vimeo(cfg) => cfg,
            other => {
                return Err(StorageError::Config(format!(
                    "expected vimeo configuration, got '{}'",
                    other.engine_type()
                )))
            }
        };
        let client = build_probe_client(cfg.timeout_secs)?;
        Ok(VimeoStorage {
            id: record.id,
            display_name: record.display_name.clone(),
            cfg,
            client,
        })
    }

    fn oembed_endpoint(&self) -> &str {
        self.cfg
            .oembed_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OEMBED_ENDPOINT)
    }
}

#[async_trait]
impl StorageEngine for VimeoStorage {
    fn class(&self) -> &'static EngineClass {
        &VIMEO
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
        let Some(video_id) = extract_video_id(url) else {
            return Ok(ParseOutcome::Rejected);
        };

        let mut meta = FileMetadata::new(MediaKind::Video);
        meta.unique_id = Some(video_id);
        meta.display_name = Some(url.to_string());

        if let Some(oembed) = fetch_oembed(&self.client, self.oembed_endpoint(), url).await? {
            apply_oembed(&mut meta, oembed);
        }

        Ok(ParseOutcome::Accepted(meta))
    }

    async fn store(
        &self,
        _file: &MediaFile,
        _source: &UploadSource,
        _meta: &FileMetadata,
    ) -> Result<Option<String>, StorageError> {
        // The asset stays on Vimeo; the video id from parse is the locator.
        Ok(None)
    }

    async fn delete(&self, _unique_id: &str) -> Result<bool, StorageError> {
        Ok(true)
    }

    fn playback_uris(&self, file: &MediaFile) -> Vec<PlaybackUri> {
        vec![PlaybackUri::new(
            UriKind::Http,
            format!("https://player.vimeo.com/video/{}", file.unique_id),
        )]
    }
}
