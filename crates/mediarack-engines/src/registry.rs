//! Engine registry
//!
//! Explicit mapping from the `engine_type` discriminator to the factory
//! that builds engine instances from persisted records. The registry is
//! populated once during application start-up, which keeps registration
//! observable and testable; there are no import-time side effects.

use std::collections::HashMap;
use std::sync::Arc;

use mediarack_core::models::EngineRecord;
use uuid::Uuid;

use crate::error::StorageError;
use crate::ftp::FtpTransportFactory;
use crate::sort::sort_engines;
use crate::traits::{EngineClass, StorageEngine};

/// Builds one engine instance from its persisted record.
pub type EngineFactory =
    Box<dyn Fn(&EngineRecord) -> Result<Arc<dyn StorageEngine>, StorageError> + Send + Sync>;

struct RegisteredEngine {
    class: &'static EngineClass,
    build: EngineFactory,
}

/// Registry of the engine types this installation can instantiate.
pub struct EngineRegistry {
    engines: HashMap<&'static str, RegisteredEngine>,
}

impl EngineRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// Register an engine class with its factory. Registering the same
    /// discriminator twice is a startup bug and fails loudly.
    pub fn register(
        &mut self,
        class: &'static EngineClass,
        build: EngineFactory,
    ) -> Result<(), StorageError> {
        if self.engines.contains_key(class.engine_type) {
            return Err(StorageError::Config(format!(
                "engine type '{}' is already registered",
                class.engine_type
            )));
        }
        self.engines
            .insert(class.engine_type, RegisteredEngine { class, build });
        Ok(())
    }

    /// Check if an engine type is registered
    pub fn contains(&self, engine_type: &str) -> bool {
        self.engines.contains_key(engine_type)
    }

    /// Class metadata for a registered engine type
    pub fn class(&self, engine_type: &str) -> Option<&'static EngineClass> {
        self.engines.get(engine_type).map(|r| r.class)
    }

    /// All registered engine types, sorted for stable listings
    pub fn types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.engines.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Build an engine instance from its persisted record.
    pub fn build(&self, record: &EngineRecord) -> Result<Arc<dyn StorageEngine>, StorageError> {
        let registered = self.engines.get(record.engine_type.as_str()).ok_or_else(|| {
            StorageError::Config(format!(
                "unknown storage engine type '{}'",
                record.engine_type
            ))
        })?;
        (registered.build)(record)
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the built-in engine classes. The FTP wire client is an external
/// collaborator and is injected through its factory.
pub fn register_builtin_engines(
    registry: &mut EngineRegistry,
    ftp_transports: Arc<dyn FtpTransportFactory>,
) -> Result<(), StorageError> {
    registry.register(
        &crate::local::LOCAL_FILE,
        Box::new(|record| Ok(Arc::new(crate::local::LocalFileStorage::from_record(record)?) as Arc<dyn StorageEngine>)),
    )?;
    registry.register(&crate::ftp::FTP, {
        Box::new(move |record| {
            Ok(Arc::new(crate::ftp::FtpStorage::from_record(
                record,
                ftp_transports.as_ref(),
            )?) as Arc<dyn StorageEngine>)
        })
    })?;
    registry.register(
        &crate::youtube::YOUTUBE,
        Box::new(|record| Ok(Arc::new(crate::youtube::YoutubeStorage::from_record(record)?) as Arc<dyn StorageEngine>)),
    )?;
    registry.register(
        &crate::vimeo::VIMEO,
        Box::new(|record| Ok(Arc::new(crate::vimeo::VimeoStorage::from_record(record)?) as Arc<dyn StorageEngine>)),
    )?;
    registry.register(
        &crate::remote_url::REMOTE_URL,
        Box::new(|record| {
            Ok(Arc::new(crate::remote_url::RemoteUrlStorage::from_record(record)?) as Arc<dyn StorageEngine>)
        }),
    )?;
    Ok(())
}

/// Instantiate every enabled engine record and return them in attempt
/// order. Enforces the per-class singleton rule before construction.
pub fn enabled_engines(
    registry: &EngineRegistry,
    records: &[EngineRecord],
) -> Result<Vec<Arc<dyn StorageEngine>>, StorageError> {
    let mut singleton_seen: HashMap<&'static str, Uuid> = HashMap::new();
    let mut engines = Vec::new();

    for record in records.iter().filter(|r| r.enabled) {
        let class = registry.class(&record.engine_type).ok_or_else(|| {
            StorageError::Config(format!(
                "unknown storage engine type '{}'",
                record.engine_type
            ))
        })?;
        if class.is_singleton {
            if let Some(previous) = singleton_seen.insert(class.engine_type, record.id) {
                return Err(StorageError::Config(format!(
                    "engine type '{}' is a singleton but instances {} and {} are both enabled",
                    class.engine_type, previous, record.id
                )));
            }
        }
        engines.push(registry.build(record)?);
    }

    sort_engines(engines)
}
