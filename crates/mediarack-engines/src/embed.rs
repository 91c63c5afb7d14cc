//! Embed-URL base helpers
//!
//! Shared behavior for engines that wrap third-party players: matching the
//! submitted URL against provider-specific patterns, and probing the
//! provider's oEmbed endpoint for title/thumbnail metadata. An engine
//! delegates here and keeps only its patterns and playback URL format.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::StorageError;
use crate::types::{FileMetadata, ThumbSource};

/// Run the URL through the provider patterns and return the first capture
/// group (the provider's video id) on a match.
pub fn capture_video_id(patterns: &[regex::Regex], url: &str) -> Option<String> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(url) {
            if let Some(id) = caps.get(1) {
                return Some(id.as_str().to_string());
            }
        }
    }
    None
}

/// Build the HTTP client used for metadata probing.
pub fn build_probe_client(timeout_secs: u64) -> Result<Client, StorageError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(StorageError::Http)
}

/// Subset of the oEmbed response the engines consume.
#[derive(Debug, Clone, Deserialize)]
pub struct OembedResponse {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration: Option<f64>,
}

/// Probe the provider's oEmbed endpoint for the given target URL.
///
/// A definitive provider answer that the video does not exist or cannot be
/// embedded (404/401/403) fails the ingestion with a user-safe error; any
/// transport-level failure degrades to `Ok(None)` since parse metadata is
/// best-effort.
pub async fn fetch_oembed(
    client: &Client,
    endpoint: &str,
    target_url: &str,
) -> Result<Option<OembedResponse>, StorageError> {
    let response = match client
        .get(endpoint)
        .query(&[("url", target_url), ("format", "json")])
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(endpoint, error = %err, "oEmbed probe failed, continuing without metadata");
            return Ok(None);
        }
    };

    let status = response.status();
    if status.as_u16() == 404 || status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(StorageError::User(
            "The video does not exist or cannot be embedded.".to_string(),
        ));
    }
    if !status.is_success() {
        tracing::warn!(endpoint, status = %status, "oEmbed probe returned an error status");
        return Ok(None);
    }

    match response.json::<OembedResponse>().await {
        Ok(body) => Ok(Some(body)),
        Err(err) => {
            tracing::warn!(endpoint, error = %err, "oEmbed response was not parseable");
            Ok(None)
        }
    }
}

/// Copy probed oEmbed fields onto the parse metadata.
pub fn apply_oembed(meta: &mut FileMetadata, oembed: OembedResponse) {
    if let Some(title) = oembed.title {
        meta.display_name = Some(title.clone());
        meta.title = Some(title);
    }
    if let Some(url) = oembed.thumbnail_url {
        meta.thumbnail = Some(ThumbSource::Url(url));
    }
    meta.width = oembed.width.or(meta.width);
    meta.height = oembed.height.or(meta.height);
    meta.duration = oembed.duration.or(meta.duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediarack_core::models::MediaKind;
    use regex::Regex;

    #[test]
    fn test_capture_video_id_first_match_wins() {
        let patterns = vec![
            Regex::new(r"^https://a\.example/(\w+)").unwrap(),
            Regex::new(r"^https://b\.example/v/(\w+)").unwrap(),
        ];
        assert_eq!(
            capture_video_id(&patterns, "https://b.example/v/abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(capture_video_id(&patterns, "https://c.example/abc"), None);
    }

    #[test]
    fn test_apply_oembed_fills_metadata() {
        let mut meta = FileMetadata::new(MediaKind::Video);
        apply_oembed(
            &mut meta,
            OembedResponse {
                title: Some("A Title".to_string()),
                thumbnail_url: Some("https://img.example/t.jpg".to_string()),
                width: Some(1280),
                height: Some(720),
                duration: Some(93.0),
            },
        );
        assert_eq!(meta.title.as_deref(), Some("A Title"));
        assert_eq!(meta.display_name.as_deref(), Some("A Title"));
        assert!(matches!(meta.thumbnail, Some(ThumbSource::Url(_))));
        assert_eq!(meta.width, Some(1280));
        assert_eq!(meta.duration, Some(93.0));
    }
}
