//! Storage engine repository: CRUD for the storage_engines table.
//!
//! `engine_type` is immutable after creation; there is deliberately no update
//! path for it. The engine-specific `config` stays an opaque JSONB value at
//! this layer.

use mediarack_core::models::EngineRecord;
use mediarack_core::AppError;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const ENGINE_COLUMNS: &str =
    "id, engine_type, display_name, enabled, config, created_at, updated_at";

/// Repository for the storage_engines table.
#[derive(Clone)]
pub struct EngineRepository {
    pool: PgPool,
}

impl EngineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new engine instance record and return it.
    #[tracing::instrument(skip(self, config), fields(db.table = "storage_engines", engine_type = %engine_type))]
    pub async fn create(
        &self,
        engine_type: &str,
        display_name: &str,
        enabled: bool,
        config: JsonValue,
    ) -> Result<EngineRecord, AppError> {
        let row: EngineRecord = sqlx::query_as::<Postgres, EngineRecord>(&format!(
            r#"
            INSERT INTO storage_engines (id, engine_type, display_name, enabled, config)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ENGINE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(engine_type)
        .bind(display_name)
        .bind(enabled)
        .bind(&config)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch an engine record by id.
    #[tracing::instrument(skip(self), fields(db.table = "storage_engines", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<EngineRecord>, AppError> {
        let row: Option<EngineRecord> = sqlx::query_as::<Postgres, EngineRecord>(&format!(
            "SELECT {} FROM storage_engines WHERE id = $1",
            ENGINE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// List every configured engine instance, stable order.
    #[tracing::instrument(skip(self), fields(db.table = "storage_engines"))]
    pub async fn list(&self) -> Result<Vec<EngineRecord>, AppError> {
        let rows: Vec<EngineRecord> = sqlx::query_as::<Postgres, EngineRecord>(&format!(
            "SELECT {} FROM storage_engines ORDER BY id",
            ENGINE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Enable or disable an engine instance.
    #[tracing::instrument(skip(self), fields(db.table = "storage_engines", db.record_id = %id))]
    pub async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE storage_engines SET enabled = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(enabled)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace an engine instance's opaque configuration map.
    #[tracing::instrument(skip(self, config), fields(db.table = "storage_engines", db.record_id = %id))]
    pub async fn update_config(&self, id: Uuid, config: JsonValue) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE storage_engines SET config = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(&config)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove an engine instance record.
    #[tracing::instrument(skip(self), fields(db.table = "storage_engines", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM storage_engines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
