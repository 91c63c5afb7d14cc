use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Kind of asset a media file carries.
///
/// `AudioDescription` and `Captions` are supplementary tracks attached to a
/// video; a `Media`'s own kind is only ever `Audio` or `Video`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
    AudioDescription,
    Captions,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::AudioDescription => write!(f, "audio_description"),
            MediaKind::Captions => write!(f, "captions"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            "audio_description" => Ok(MediaKind::AudioDescription),
            "captions" => Ok(MediaKind::Captions),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// Owning content record. Holds the operator-entered presentation fields the
/// ingestion pipeline backfills only while they are still unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Media {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<MediaKind>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    /// Locator of a non-default thumbnail; `None` means the placeholder.
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stored asset, bound to its parent media and to exactly one engine
/// instance. `engine_id` is set at creation and never reassigned; `unique_id`
/// is the engine-specific locator (file name, remote video id, URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaFile {
    pub id: Uuid,
    pub media_id: Uuid,
    pub engine_id: Uuid,
    pub kind: MediaKind,
    /// Container format hint (usually the file extension; empty for embeds).
    pub container: String,
    pub display_name: String,
    pub unique_id: String,
    pub size: Option<i64>,
    pub bitrate: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a media file stub. The repository assigns the id and
/// timestamps; `unique_id` may still be empty at this point and is finalized
/// after the owning engine has stored the asset.
#[derive(Debug, Clone)]
pub struct NewMediaFile {
    pub media_id: Uuid,
    pub engine_id: Uuid,
    pub kind: MediaKind,
    pub container: String,
    pub display_name: String,
    pub unique_id: String,
    pub size: Option<i64>,
    pub bitrate: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
