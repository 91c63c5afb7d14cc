//! Test doubles for exercising the pipeline without a database or real
//! backends.

pub mod mock_engines;
pub mod mock_repositories;

pub use mock_engines::{
    ParseBehavior, PostprocessBehavior, RecordingEngine, RecordingThumbnailer, StoreBehavior,
    ThumbBehavior, TranscodeBehavior, MOCK_CATCHALL, MOCK_EMBED, MOCK_FILE, MOCK_FILE_AFTER_EMBED,
};
pub use mock_repositories::MockIngestRepository;
