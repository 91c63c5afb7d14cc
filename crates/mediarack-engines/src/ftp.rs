//! FTP storage engine
//!
//! Uploads go to a remote FTP server and are served back over plain HTTP
//! from a configured base URL. The wire protocol lives behind the
//! [`FtpTransport`] trait; this engine only sequences put / verify / remove
//! against it. Several FTP instances may be enabled at once, one per server.

use async_trait::async_trait;
use mediarack_core::models::{EngineRecord, MediaFile};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{EngineConfig, FtpConfig};
use crate::error::StorageError;
use crate::traits::{EngineClass, ParseOutcome, StorageEngine};
use crate::types::{FileMetadata, PlaybackUri, UploadSource, UriKind};
use crate::upload::parse_file_upload;

fn default_config() -> JsonValue {
    serde_json::json!({
        "server": "",
        "port": 21,
        "username": "",
        "password": "",
        "remote_dir": "",
        "http_base_url": "",
        "verify_uploads": true
    })
}

pub static FTP: EngineClass = EngineClass {
    engine_type: "ftp",
    label: "FTP Storage",
    is_singleton: false,
    try_before: &[],
    try_after: &[],
    default_config,
};

/// Byte-transfer operations an FTP client must provide. The concrete wire
/// client is an external collaborator supplied at registration time.
#[async_trait]
pub trait FtpTransport: Send + Sync {
    /// Upload the full payload under the given remote name.
    async fn put(&self, remote_name: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove a remote file; returns whether it is gone afterwards.
    async fn remove(&self, remote_name: &str) -> Result<bool, StorageError>;

    /// Size of a remote file, when the server reports one.
    async fn size(&self, remote_name: &str) -> Result<Option<u64>, StorageError>;
}

/// Builds a connected [`FtpTransport`] for a validated configuration.
pub trait FtpTransportFactory: Send + Sync {
    fn connect(&self, config: &FtpConfig) -> Result<Arc<dyn FtpTransport>, StorageError>;
}

/// Factory used when the application has not wired an FTP client; any
/// enabled FTP instance then fails loudly at startup instead of at upload
/// time.
pub struct DisabledFtpTransportFactory;

impl FtpTransportFactory for DisabledFtpTransportFactory {
    fn connect(&self, _config: &FtpConfig) -> Result<Arc<dyn FtpTransport>, StorageError> {
        Err(StorageError::Config(
            "no FTP transport is configured for this installation".to_string(),
        ))
    }
}

pub struct FtpStorage {
    id: Uuid,
    display_name: String,
    cfg: FtpConfig,
    transport: Arc<dyn FtpTransport>,
}

impl FtpStorage {
    pub fn from_record(
        record: &EngineRecord,
        factory: &dyn FtpTransportFactory,
    ) -> Result<Self, StorageError> {
        let cfg = match EngineConfig::from_record(record)? {
            EngineConfig::Ftp(cfg) => cfg,
            other => {
                return Err(StorageError::Config(format!(
                    "expected ftp configuration, got '{}'",
                    other.engine_type()
                )))
            }
        };
        let transport = factory.connect(&cfg)?;
        Ok(FtpStorage {
            id: record.id,
            display_name: record.display_name.clone(),
            cfg,
            transport,
        })
    }

    /// Remote name for a media file: `{id}.{container}`, flat within the
    /// configured remote directory.
    fn remote_name(file: &MediaFile) -> String {
        if file.container.is_empty() {
            file.id.to_string()
        } else {
            format!("{}.{}", file.id, file.container)
        }
    }
}

#[async_trait]
impl StorageEngine for FtpStorage {
    fn class(&self) -> &'static EngineClass {
        &FTP
    }

    fn instance_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn parse(&self, source: &UploadSource) -> Result<ParseOutcome, StorageError> {
        Ok(parse_file_upload(source))
    }

    async fn store(
        &self,
        file: &MediaFile,
        source: &UploadSource,
        _meta: &FileMetadata,
    ) -> Result<Option<String>, StorageError> {
        let upload = source.file().ok_or_else(|| {
            StorageError::Store("ftp storage requires an uploaded file".to_string())
        })?;

        let remote_name = Self::remote_name(file);
        self.transport.put(&remote_name, &upload.data).await?;

        if self.cfg.verify_uploads {
            match self.transport.size(&remote_name).await? {
                Some(reported) if reported != upload.data.len() as u64 => {
                    // Leave no partial upload behind before failing.
                    if let Err(e) = self.transport.remove(&remote_name).await {
                        tracing::warn!(
                            remote_name = %remote_name,
                            error = %e,
                            "failed to remove corrupt upload after size mismatch"
                        );
                    }
                    return Err(StorageError::Integrity(format!(
                        "remote size {} does not match uploaded size {} for {}",
                        reported,
                        upload.data.len(),
                        remote_name
                    )));
                }
                Some(_) => {}
                None => {
                    tracing::warn!(
                        remote_name = %remote_name,
                        "ftp server does not report sizes, skipping upload verification"
                    );
                }
            }
        }

        tracing::info!(
            server = %self.cfg.server,
            remote_name = %remote_name,
            size_bytes = upload.data.len(),
            "stored media file on ftp server"
        );

        Ok(Some(remote_name))
    }

    async fn delete(&self, unique_id: &str) -> Result<bool, StorageError> {
        self.transport.remove(unique_id).await
    }

    fn playback_uris(&self, file: &MediaFile) -> Vec<PlaybackUri> {
        vec![PlaybackUri::new(
            UriKind::Http,
            format!(
                "{}/{}",
                self.cfg.http_base_url.trim_end_matches('/'),
                urlencoding::encode(&file.unique_id)
            ),
        )]
    }
}
