//! Mediarack Database Layer
//!
//! This crate provides the sqlx/Postgres repositories for media, media files,
//! and storage engine records, plus the repository trait abstraction the
//! ingestion pipeline is written against.

pub mod db;
pub mod ingest_traits;

// Re-exports: repositories and helpers
pub use db::engine::EngineRepository;
pub use db::media::MediaRepository;
pub use db::media_file::MediaFileRepository;
pub use db::transaction::with_transaction;

// Re-exports: ingestion seam
pub use ingest_traits::{DbIngestRepository, IngestRepository};
