//! Configuration module
//!
//! Environment-driven configuration for the ingestion service. Engine
//! instances themselves are configured through persisted [`EngineRecord`]s;
//! the values here cover the database connection and the defaults used when
//! seeding a fresh installation with its first local-file engine.
//!
//! [`EngineRecord`]: crate::models::EngineRecord

use std::env;

use crate::constants::DEFAULT_HTTP_TIMEOUT_SECS;

/// Service configuration loaded from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    /// Root directory for the default local-file engine seeded on first run.
    pub local_storage_path: Option<String>,
    /// Public base URL under which locally stored files are served.
    pub local_storage_base_url: Option<String>,
    /// Optional RTMP server prefix for locally stored videos.
    pub rtmp_server_uri: Option<String>,
    /// Timeout for metadata-probing HTTP requests (oEmbed lookups).
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let http_timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be an integer: {}", raw))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Config {
            database_url,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            rtmp_server_uri: env::var("RTMP_SERVER_URI").ok(),
            http_timeout_secs,
        })
    }
}
