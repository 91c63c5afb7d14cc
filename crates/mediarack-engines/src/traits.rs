//! Storage engine capability interface
//!
//! Every backend implements [`StorageEngine`]. The ingestion pipeline walks
//! the ordered engine list, lets the first accepting engine own the file,
//! and later offers the stored file to every engine for transcoding.

use async_trait::async_trait;
use mediarack_core::models::MediaFile;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::{FileMetadata, PlaybackUri, UploadSource};

/// Static metadata shared by all instances of one engine type.
///
/// `try_before`/`try_after` name the engine types this class must be
/// attempted before/after; [`sort_engines`](crate::sort::sort_engines) turns
/// these partial-order hints into the total attempt order. Hints naming
/// types that are not currently enabled are ignored.
pub struct EngineClass {
    /// Stable discriminator, matches the `engine_type` column.
    pub engine_type: &'static str,
    /// Human-readable name for configuration UIs.
    pub label: &'static str,
    /// At most one enabled instance of this class may exist.
    pub is_singleton: bool,
    pub try_before: &'static [&'static str],
    pub try_after: &'static [&'static str],
    /// Operator-facing default configuration for new instances.
    pub default_config: fn() -> JsonValue,
}

/// Result of offering an input to an engine's `parse`.
///
/// `Rejected` is the expected "not mine, try the next one" signal of the
/// chain of responsibility; it is a value, not an error, and is never shown
/// to the user.
#[derive(Clone, Debug)]
pub enum ParseOutcome {
    Accepted(FileMetadata),
    Rejected,
}

/// Result of offering a stored file to an engine's `transcode`. Declining
/// is normal; most engines do not produce derived files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscodeOutcome {
    Accepted,
    Declined,
}

/// The contract every storage backend implements.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Class-level metadata (discriminator, ordering hints, singleton flag).
    fn class(&self) -> &'static EngineClass;

    /// Id of the configured instance row; the deterministic tie-break key
    /// when several instances share an unordered class.
    fn instance_id(&self) -> Uuid;

    fn display_name(&self) -> &str;

    /// Inspect the input and either return extracted metadata or reject it.
    ///
    /// Must not persist anything; best-effort metadata probing (e.g. an
    /// HTTP GET to read a title) is allowed.
    async fn parse(&self, source: &UploadSource) -> Result<ParseOutcome, StorageError>;

    /// Persist the asset for a media file that already has its primary key.
    ///
    /// Returns the engine-specific unique id, or `None` when the id was
    /// already supplied through parse metadata. A failure must leave no
    /// partial state observable by other engines.
    async fn store(
        &self,
        file: &MediaFile,
        source: &UploadSource,
        meta: &FileMetadata,
    ) -> Result<Option<String>, StorageError>;

    /// Hook invoked only after store, thumbnail, and flush all succeeded.
    async fn postprocess(&self, _file: &MediaFile) -> Result<(), StorageError> {
        Ok(())
    }

    /// Whether this engine will produce derived files for an already-stored
    /// media file. Called for every stored file, regardless of owner.
    async fn transcode(&self, _file: &MediaFile) -> Result<TranscodeOutcome, StorageError> {
        Ok(TranscodeOutcome::Declined)
    }

    /// Best-effort removal of the underlying asset. Returns whether the
    /// asset is gone afterwards.
    async fn delete(&self, unique_id: &str) -> Result<bool, StorageError>;

    /// Enumerate playback locations for a stored file.
    fn playback_uris(&self, file: &MediaFile) -> Vec<PlaybackUri>;
}
