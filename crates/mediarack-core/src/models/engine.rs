use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Persisted configuration of one storage engine instance.
///
/// `engine_type` is the discriminator that selects the concrete
/// implementation and is immutable after creation. `config` is an opaque
/// string-keyed JSON map; each engine deserializes and validates its own
/// typed view of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct EngineRecord {
    pub id: Uuid,
    pub engine_type: String,
    pub display_name: String,
    pub enabled: bool,
    pub config: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EngineRecord {
    /// Build an in-memory record, e.g. for seeding or tests. The database
    /// assigns its own timestamps on insert.
    pub fn new(
        id: Uuid,
        engine_type: impl Into<String>,
        display_name: impl Into<String>,
        enabled: bool,
        config: JsonValue,
    ) -> Self {
        let now = Utc::now();
        EngineRecord {
            id,
            engine_type: engine_type.into(),
            display_name: display_name.into(),
            enabled,
            config,
            created_at: now,
            updated_at: now,
        }
    }
}
