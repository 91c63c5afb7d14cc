//! Mediarack Storage Engines
//!
//! This crate provides the storage-engine abstraction and its concrete
//! backends. An engine binds one backend technology (local disk, FTP,
//! YouTube, Vimeo, plain remote URLs) behind the [`StorageEngine`]
//! capability interface; the [`registry`] assembles the enabled instances
//! and [`sort_engines`] orders them for the ingestion pipeline.

pub mod config;
pub mod embed;
pub mod error;
pub mod ftp;
pub mod local;
pub mod registry;
pub mod remote_url;
pub mod sort;
pub mod traits;
pub mod types;
pub mod upload;
pub mod vimeo;
pub mod youtube;

// Re-export commonly used types
pub use config::{EmbedConfig, EngineConfig, FtpConfig, LocalFileConfig, RemoteUrlConfig};
pub use error::StorageError;
pub use ftp::{DisabledFtpTransportFactory, FtpStorage, FtpTransport, FtpTransportFactory};
pub use local::LocalFileStorage;
pub use registry::{enabled_engines, register_builtin_engines, EngineFactory, EngineRegistry};
pub use remote_url::RemoteUrlStorage;
pub use sort::sort_engines;
pub use traits::{EngineClass, ParseOutcome, StorageEngine, TranscodeOutcome};
pub use types::{FileMetadata, PlaybackUri, ThumbSource, UploadSource, UploadedFile, UriKind};
pub use vimeo::VimeoStorage;
pub use youtube::YoutubeStorage;
