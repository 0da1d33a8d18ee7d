//! Postgres-backed table client.
//!
//! All logical tables share one physical JSONB table keyed by
//! `(table_name, row_key)`:
//!
//! ```sql
//! CREATE TABLE condo_rows (
//!     table_name    TEXT        NOT NULL,
//!     row_key       UUID        NOT NULL,
//!     enterprise_id UUID,
//!     data          JSONB       NOT NULL,
//!     updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (table_name, row_key)
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `DuplicateKey` |
//! | Database (undefined table) | `42P01` | `MissingTable` |
//! | Zero rows affected on update/delete | n/a | `NotFound` |
//! | Row column decode failure | n/a | `Schema` |
//! | Anything else | any | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row as _};
use tracing::instrument;
use uuid::Uuid;

use condohub_core::EnterpriseId;

use super::{Query, Row, StoreError, TableClient};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS condo_rows (
    table_name    TEXT        NOT NULL,
    row_key       UUID        NOT NULL,
    enterprise_id UUID,
    data          JSONB       NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (table_name, row_key)
);
CREATE INDEX IF NOT EXISTS condo_rows_enterprise_idx ON condo_rows (table_name, enterprise_id);
"#;

/// Postgres table client.
///
/// `Send + Sync`; the SQLx pool handles connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresTableClient {
    pool: Arc<PgPool>,
}

impl PostgresTableClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", "condo_rows", e))?;
        Ok(Self::new(pool))
    }

    /// Create the row table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", "condo_rows", e))?;
        Ok(())
    }
}

fn containment_filter(query: &Query) -> JsonValue {
    let map: Map<String, JsonValue> = query.eq.iter().cloned().collect();
    JsonValue::Object(map)
}

#[async_trait]
impl TableClient for PostgresTableClient {
    #[instrument(skip(self, query), fields(table = %table), err)]
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT row_key, enterprise_id, data
            FROM condo_rows
            WHERE table_name = $1
              AND ($2::uuid IS NULL OR enterprise_id = $2)
              AND ($3::uuid IS NULL OR row_key = $3)
              AND data @> $4
            ORDER BY row_key ASC
            "#,
        )
        .bind(table)
        .bind(query.enterprise_id.map(Uuid::from))
        .bind(query.key)
        .bind(Json(containment_filter(query)))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("select", table, e))?;

        rows.into_iter()
            .map(|r| {
                let schema = |e: sqlx::Error| StoreError::Schema {
                    table: table.to_string(),
                    message: e.to_string(),
                };
                Ok(Row {
                    key: r.try_get::<Uuid, _>("row_key").map_err(schema)?,
                    enterprise_id: r
                        .try_get::<Option<Uuid>, _>("enterprise_id")
                        .map_err(schema)?
                        .map(EnterpriseId::from_uuid),
                    data: r.try_get::<Json<JsonValue>, _>("data").map_err(schema)?.0,
                })
            })
            .collect()
    }

    #[instrument(skip(self, row), fields(table = %table, key = %row.key), err)]
    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO condo_rows (table_name, row_key, enterprise_id, data)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(table)
        .bind(row.key)
        .bind(row.enterprise_id.map(Uuid::from))
        .bind(Json(&row.data))
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert", table, e) {
            StoreError::DuplicateKey { table, .. } => StoreError::DuplicateKey { table, key: row.key },
            other => other,
        })?;
        Ok(())
    }

    #[instrument(skip(self, row), fields(table = %table, key = %row.key), err)]
    async fn update(&self, table: &str, row: Row) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE condo_rows
            SET enterprise_id = $3, data = $4, updated_at = NOW()
            WHERE table_name = $1 AND row_key = $2
            "#,
        )
        .bind(table)
        .bind(row.key)
        .bind(row.enterprise_id.map(Uuid::from))
        .bind(Json(&row.data))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", table, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: table.to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(table = %table, key = %key), err)]
    async fn delete(&self, table: &str, key: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM condo_rows WHERE table_name = $1 AND row_key = $2")
            .bind(table)
            .bind(key)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", table, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: table.to_string(),
            });
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, table: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::DuplicateKey {
                table: table.to_string(),
                key: Uuid::nil(),
            },
            Some("42P01") => StoreError::MissingTable(table.to_string()),
            _ => StoreError::Backend(format!("database error in {operation}: {}", db_err.message())),
        },
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Schema {
            table: table.to_string(),
            message: err.to_string(),
        },
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
