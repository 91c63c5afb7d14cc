//! Mediarack Ingestion
//!
//! The transactional sequence that turns a raw upload or URL into a
//! persisted, playable media file: parse across the ordered engines, flush a
//! stub row so the winning engine can derive storage names from its id,
//! store, backfill parent metadata, thumbnail, and offer the stored file for
//! transcoding.

pub mod pipeline;
pub mod setup;
pub mod test_helpers;
pub mod thumbnail;

pub use pipeline::{backfill_media, MediaIngest};
pub use setup::build_media_ingest;
pub use thumbnail::{NoopThumbnailer, ThumbnailError, Thumbnailer};
