//! Domain models.

pub mod engine;
pub mod media;

pub use engine::EngineRecord;
pub use media::{Media, MediaFile, MediaKind, NewMediaFile};
