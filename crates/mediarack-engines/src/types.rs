//! Types crossing the engine boundary.

use mediarack_core::models::MediaKind;

use crate::error::StorageError;

/// An uploaded file as received from the request layer.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased filename extension, if any.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }
}

/// The input to one ingestion call: an uploaded file, a URL, or both
/// (engines decide which side they look at). At least one must be present.
#[derive(Clone, Debug)]
pub struct UploadSource {
    file: Option<UploadedFile>,
    url: Option<String>,
}

impl UploadSource {
    pub fn new(
        file: Option<UploadedFile>,
        url: Option<String>,
    ) -> Result<Self, StorageError> {
        let url = url.filter(|u| !u.trim().is_empty());
        if file.is_none() && url.is_none() {
            return Err(StorageError::User(
                "Please provide a file or a link to add.".to_string(),
            ));
        }
        Ok(UploadSource { file, url })
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Where a thumbnail for the parsed asset can be obtained.
#[derive(Clone, Debug)]
pub enum ThumbSource {
    Url(String),
    Bytes(Vec<u8>),
}

/// Metadata an engine extracted from the input during `parse`. Only `kind`
/// is mandatory; everything else is filled in on a best-effort basis.
#[derive(Clone, Debug)]
pub struct FileMetadata {
    pub kind: MediaKind,
    pub unique_id: Option<String>,
    pub container: Option<String>,
    pub display_name: Option<String>,
    pub size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub bitrate: Option<i32>,
    pub duration: Option<f64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<ThumbSource>,
}

impl FileMetadata {
    pub fn new(kind: MediaKind) -> Self {
        FileMetadata {
            kind,
            unique_id: None,
            container: None,
            display_name: None,
            size: None,
            width: None,
            height: None,
            bitrate: None,
            duration: None,
            title: None,
            description: None,
            thumbnail: None,
        }
    }
}

/// Scheme class of a playback location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UriKind {
    Http,
    Rtmp,
    File,
}

/// One playback location for a stored media file. Engines may report
/// several (e.g. a CDN URL and a raw filesystem path).
#[derive(Clone, Debug)]
pub struct PlaybackUri {
    pub kind: UriKind,
    pub uri: String,
}

impl PlaybackUri {
    pub fn new(kind: UriKind, uri: impl Into<String>) -> Self {
        PlaybackUri {
            kind,
            uri: uri.into(),
        }
    }
}
