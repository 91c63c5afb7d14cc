//! Mediarack Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! shared across all Mediarack components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::AppError;
pub use models::{EngineRecord, Media, MediaFile, MediaKind, NewMediaFile};
