//! Ingestion setup and initialization
//!
//! Startup glue: build the engine registry, load (or seed) the configured
//! engine records, and assemble the [`MediaIngest`] service.

use anyhow::Result;
use std::sync::Arc;

use mediarack_core::models::EngineRecord;
use mediarack_core::Config;
use mediarack_db::{DbIngestRepository, EngineRepository};
use mediarack_engines::{
    enabled_engines, register_builtin_engines, EngineConfig, EngineRegistry, FtpTransportFactory,
    LocalFileConfig,
};
use sqlx::PgPool;

use crate::pipeline::MediaIngest;
use crate::thumbnail::Thumbnailer;

/// Build the ingestion service for this installation.
///
/// A fresh database (no engine records at all) is seeded with the default
/// engine set: a local-file engine when `LOCAL_STORAGE_PATH` is configured,
/// plus the embed and remote-URL engines.
pub async fn build_media_ingest(
    pool: PgPool,
    config: &Config,
    ftp_transports: Arc<dyn FtpTransportFactory>,
    thumbnailer: Arc<dyn Thumbnailer>,
) -> Result<MediaIngest> {
    tracing::info!("Initializing storage engines...");
    let mut registry = EngineRegistry::new();
    register_builtin_engines(&mut registry, ftp_transports)?;

    let engine_repo = EngineRepository::new(pool.clone());
    let mut records = engine_repo.list().await?;
    if records.is_empty() {
        records = seed_default_engines(&engine_repo, config).await?;
    }

    let engines = enabled_engines(&registry, &records)?;
    tracing::info!(count = engines.len(), "storage engines initialized");

    Ok(MediaIngest::new(
        engines,
        Arc::new(DbIngestRepository::new(pool)),
        thumbnailer,
    ))
}

async fn seed_default_engines(
    repo: &EngineRepository,
    config: &Config,
) -> Result<Vec<EngineRecord>> {
    let mut records = Vec::new();

    if let Some(path) = &config.local_storage_path {
        let local = EngineConfig::LocalFile(LocalFileConfig {
            path: path.clone(),
            base_url: config.local_storage_base_url.clone(),
            rtmp_server_uri: config.rtmp_server_uri.clone(),
        });
        records.push(
            repo.create(
                local.engine_type(),
                mediarack_engines::local::LOCAL_FILE.label,
                true,
                local.to_json()?,
            )
            .await?,
        );
    } else {
        tracing::warn!("LOCAL_STORAGE_PATH is not set, skipping the local-file engine");
    }

    for class in [
        &mediarack_engines::youtube::YOUTUBE,
        &mediarack_engines::vimeo::VIMEO,
        &mediarack_engines::remote_url::REMOTE_URL,
    ] {
        records.push(
            repo.create(
                class.engine_type,
                class.label,
                true,
                (class.default_config)(),
            )
            .await?,
        );
    }

    tracing::info!(count = records.len(), "seeded default storage engines");
    Ok(records)
}
