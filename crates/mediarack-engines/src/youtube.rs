//! YouTube embed engine

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

const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

fn default_config() -> JsonValue {
    serde_json::json!({})
}

pub static YOUTUBE: EngineClass = EngineClass {
    engine_type: "youtube",
    label: "YouTube",
    is_singleton: true,
    try_before: &[],
    // A locally uploaded file must never be mistaken for an embed.
    try_after: &["local_file", "ftp"],
    default_config,
};

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"^https?://(?:www\.|m\.)?youtube\.com/watch\?(?:[^#]*&)*v=([A-Za-z0-9_-]{11})")
                .expect("valid pattern"),
            Regex::new(r"^https?://youtu\.be/([A-Za-z0-9_-]{11})").expect("valid pattern"),
            Regex::new(r"^https?://(?:www\.)?youtube\.com/(?:embed|shorts|v)/([A-Za-z0-9_-]{11})")
                .expect("valid pattern"),
        ]
    })
}

/// Extract the 11-character video id from any supported YouTube URL shape.
pub fn extract_video_id(url: &str) -> Option<String> {
    capture_video_id(patterns(), url.trim())
}

pub struct YoutubeStorage {
    id: Uuid,
    display_name: String,
    cfg: EmbedConfig,
    client: reqwest::Client,
}

impl YoutubeStorage {
    pub fn from_record(record: &EngineRecord) -> Result<Self, StorageError> {
        let cfg = match EngineConfig::from_record(record)? {
            EngineConfig::Youtube(cfg) => cfg,
            other => {
                return Err(StorageError::Config(format!(
                    "expected youtube configuration, got '{}'",
                    other.engine_type()
                )))
            }
        };
        let client = build_probe_client(cfg.timeout_secs)?;
        Ok(YoutubeStorage {
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
impl StorageEngine for YoutubeStorage {
    fn class(&self) -> &'static EngineClass {
        &YOUTUBE
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
        // The asset stays on YouTube; the video id from parse is the locator.
        Ok(None)
    }

    async fn delete(&self, _unique_id: &str) -> Result<bool, StorageError> {
        Ok(true)
    }

    fn playback_uris(&self, file: &MediaFile) -> Vec<PlaybackUri> {
        vec![PlaybackUri::new(
            UriKind::Http,
            format!("https://www.youtube.com/embed/{}", file.unique_id),
        )]
    }
}
