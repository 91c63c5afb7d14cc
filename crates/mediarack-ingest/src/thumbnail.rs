//! Thumbnail collaborator contract
//!
//! Thumbnail resizing itself lives outside this crate; the pipeline only
//! needs a way to hand over a source image and learn the stored locator.
//! The error split matters: failing to *fetch* a remote source is transient
//! and ingestion continues without a thumbnail, while a failure inside
//! *generation* aborts the ingestion.

use async_trait::async_trait;
use mediarack_core::models::Media;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// Transient failure obtaining the source image (e.g. a remote fetch).
    #[error("thumbnail fetch failed: {0}")]
    Fetch(String),

    /// Failure inside thumbnail generation itself.
    #[error("thumbnail generation failed: {0}")]
    Generate(String),
}

/// Materializes thumbnails for a media record. Returns the locator of the
/// stored thumbnail, or `None` when the implementation produces nothing.
#[async_trait]
pub trait Thumbnailer: Send + Sync {
    async fn create_from_url(
        &self,
        media: &Media,
        url: &str,
    ) -> Result<Option<String>, ThumbnailError>;

    async fn create_from_bytes(
        &self,
        media: &Media,
        data: &[u8],
    ) -> Result<Option<String>, ThumbnailError>;
}

/// No-op implementation for installations without thumbnail support.
pub struct NoopThumbnailer;

#[async_trait]
impl Thumbnailer for NoopThumbnailer {
    async fn create_from_url(
        &self,
        _media: &Media,
        _url: &str,
    ) -> Result<Option<String>, ThumbnailError> {
        Ok(None)
    }

    async fn create_from_bytes(
        &self,
        _media: &Media,
        _data: &[u8],
    ) -> Result<Option<String>, ThumbnailError> {
        Ok(None)
    }
}
