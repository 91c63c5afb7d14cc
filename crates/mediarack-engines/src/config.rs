//! Typed engine configuration
//!
//! Engine instance rows carry an opaque JSON map plus the `engine_type`
//! discriminator column. [`EngineConfig`] is the typed in-memory view: one
//! variant per engine type, mapping 1:1 to the stored discriminator. Each
//! engine deserializes and validates its own variant; unknown keys in the
//! stored map are rejected so configuration typos surface at startup.

use mediarack_core::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use mediarack_core::models::EngineRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::StorageError;

/// Configuration for the local-file engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalFileConfig {
    /// Root directory files are written under.
    pub path: String,
    /// Public base URL files are served from, when HTTP serving is set up.
    #[serde(default)]
    pub base_url: Option<String>,
    /// RTMP prefix for streaming locally stored videos.
    #[serde(default)]
    pub rtmp_server_uri: Option<String>,
}

impl LocalFileConfig {
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.path.trim().is_empty() {
            return Err(StorageError::Config(
                "local-file engine requires a storage path".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for an FTP engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FtpConfig {
    pub server: String,
    #[serde(default = "default_ftp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Directory on the server uploads are placed in.
    #[serde(default)]
    pub remote_dir: String,
    /// Public HTTP base URL the uploaded files are served from.
    pub http_base_url: String,
    /// Re-check the remote size after upload and fail on mismatch.
    #[serde(default = "default_true")]
    pub verify_uploads: bool,
}

fn default_ftp_port() -> u16 {
    21
}

fn default_true() -> bool {
    true
}

impl FtpConfig {
    pub fn validate(&self) -> Result<(), StorageError> {
        for (field, value) in [
            ("server", &self.server),
            ("username", &self.username),
            ("http_base_url", &self.http_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(StorageError::Config(format!(
                    "ftp engine requires '{}' to be set",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// Configuration shared by the oEmbed-backed embed engines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedConfig {
    /// Override of the provider's oEmbed endpoint.
    #[serde(default)]
    pub oembed_endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl EmbedConfig {
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.timeout_secs == 0 {
            return Err(StorageError::Config(
                "embed engine timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the catch-all remote URL engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteUrlConfig {
    /// Issue a HEAD request during parse to learn the remote size.
    #[serde(default)]
    pub probe_size: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteUrlConfig {
    fn default() -> Self {
        RemoteUrlConfig {
            probe_size: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteUrlConfig {
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.timeout_secs == 0 {
            return Err(StorageError::Config(
                "remote-url engine timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// The typed configuration union. Variant tags map 1:1 to the stored
/// `engine_type` discriminator.
#[derive(Debug, Clone)]
pub enum EngineConfig {
    LocalFile(LocalFileConfig),
    Ftp(FtpConfig),
    Youtube(EmbedConfig),
    Vimeo(EmbedConfig),
    RemoteUrl(RemoteUrlConfig),
}

impl EngineConfig {
    /// The discriminator this variant persists under.
    pub fn engine_type(&self) -> &'static str {
        match self {
            EngineConfig::LocalFile(_) => "local_file",
            EngineConfig::Ftp(_) => "ftp",
            EngineConfig::Youtube(_) => "youtube",
            EngineConfig::Vimeo(_) => "vimeo",
            EngineConfig::RemoteUrl(_) => "remote_url",
        }
    }

    /// Deserialize the typed view of a persisted engine record.
    pub fn from_record(record: &EngineRecord) -> Result<Self, StorageError> {
        let config = record.config.clone();
        let parsed = match record.engine_type.as_str() {
            "local_file" => EngineConfig::LocalFile(parse_config(config, &record.engine_type)?),
            "ftp" => EngineConfig::Ftp(parse_config(config, &record.engine_type)?),
            "youtube" => EngineConfig::Youtube(parse_config(config, &record.engine_type)?),
            "vimeo" => EngineConfig::Vimeo(parse_config(config, &record.engine_type)?),
            "remote_url" => EngineConfig::RemoteUrl(parse_config(config, &record.engine_type)?),
            other => {
                return Err(StorageError::Config(format!(
                    "unknown storage engine type '{}'",
                    other
                )))
            }
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Serialize back to the opaque map stored on the record.
    pub fn to_json(&self) -> Result<JsonValue, StorageError> {
        let value = match self {
            EngineConfig::LocalFile(c) => serde_json::to_value(c),
            EngineConfig::Ftp(c) => serde_json::to_value(c),
            EngineConfig::Youtube(c) | EngineConfig::Vimeo(c) => serde_json::to_value(c),
            EngineConfig::RemoteUrl(c) => serde_json::to_value(c),
        };
        value.map_err(|e| StorageError::Config(format!("unserializable engine config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        match self {
            EngineConfig::LocalFile(c) => c.validate(),
            EngineConfig::Ftp(c) => c.validate(),
            EngineConfig::Youtube(c) | EngineConfig::Vimeo(c) => c.validate(),
            EngineConfig::RemoteUrl(c) => c.validate(),
        }
    }
}

fn parse_config<T: serde::de::DeserializeOwned>(
    config: JsonValue,
    engine_type: &str,
) -> Result<T, StorageError> {
    serde_json::from_value(config).map_err(|e| {
        StorageError::Config(format!(
            "invalid configuration for engine type '{}': {}",
            engine_type, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn record(engine_type: &str, config: JsonValue) -> EngineRecord {
        EngineRecord::new(Uuid::new_v4(), engine_type, "test", true, config)
    }

    #[test]
    fn test_local_file_round_trip() {
        let rec = record("local_file", json!({"path": "/var/lib/mediarack"}));
        let cfg = EngineConfig::from_record(&rec).unwrap();
        assert_eq!(cfg.engine_type(), "local_file");
        match &cfg {
            EngineConfig::LocalFile(c) => {
                assert_eq!(c.path, "/var/lib/mediarack");
                assert!(c.base_url.is_none());
            }
            other => panic!("wrong variant: {:?}", other),
        }
        let json = cfg.to_json().unwrap();
        assert_eq!(json["path"], "/var/lib/mediarack");
    }

    #[test]
    fn test_empty_path_rejected() {
        let rec = record("local_file", json!({"path": "  "}));
        assert!(matches!(
            EngineConfig::from_record(&rec),
            Err(StorageError::Config(_))
        ));
    }

    #[test]
    fn test_ftp_defaults_applied() {
        let rec = record(
            "ftp",
            json!({
                "server": "ftp.example.com",
                "username": "media",
                "password": "secret",
                "http_base_url": "https://cdn.example.com/media"
            }),
        );
        match EngineConfig::from_record(&rec).unwrap() {
            EngineConfig::Ftp(c) => {
                assert_eq!(c.port, 21);
                assert!(c.verify_uploads);
                assert_eq!(c.remote_dir, "");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_engine_type_rejected() {
        let rec = record("s3", json!({}));
        let err = EngineConfig::from_record(&rec).unwrap_err();
        assert!(err.to_string().contains("s3"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let rec = record("youtube", json!({"oembed_url": "https://example.com"}));
        assert!(matches!(
            EngineConfig::from_record(&rec),
            Err(StorageError::Config(_))
        ));
    }

    #[test]
    fn test_embed_defaults() {
        let rec = record("vimeo", json!({}));
        match EngineConfig::from_record(&rec).unwrap() {
            EngineConfig::Vimeo(c) => {
                assert!(c.oembed_endpoint.is_none());
                assert_eq!(c.timeout_secs, 15);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }
}
