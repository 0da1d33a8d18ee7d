//! Generic table store.
//!
//! Every entity is persisted as one JSON row in a named table. The
//! [`TableClient`] trait is the only seam between the gateways and the
//! backing service; it exposes the four calls the hosted backend offers
//! (select, insert, update, delete) and nothing else. There are no
//! cross-call transactions: last write wins.

pub mod memory;
pub mod postgres;
pub mod table;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use condohub_core::EnterpriseId;

pub use memory::InMemoryTableClient;
pub use postgres::PostgresTableClient;
pub use table::Table;

/// One stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: Uuid,
    /// `None` only for global tables (user accounts).
    pub enterprise_id: Option<EnterpriseId>,
    pub data: JsonValue,
}

/// Row selection: tenant scope, optional key, and top-level field equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub enterprise_id: Option<EnterpriseId>,
    pub key: Option<Uuid>,
    pub eq: Vec<(String, JsonValue)>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn scoped(enterprise_id: EnterpriseId) -> Self {
        Self {
            enterprise_id: Some(enterprise_id),
            ..Self::default()
        }
    }

    pub fn key(mut self, key: Uuid) -> Self {
        self.key = Some(key);
        self
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.eq.push((field.into(), value.into()));
        self
    }

    /// Whether `row` satisfies this query.
    pub fn matches(&self, row: &Row) -> bool {
        if self.enterprise_id.is_some() && self.enterprise_id != row.enterprise_id {
            return false;
        }
        if self.key.is_some_and(|k| k != row.key) {
            return false;
        }
        self.eq
            .iter()
            .all(|(field, value)| row.data.get(field) == Some(value))
    }
}

/// Store errors.
///
/// Every variant is blocking for the caller: the API maps them to JSON error
/// responses (409, 404, 500, 502).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate key in '{table}': {key}")]
    DuplicateKey { table: String, key: Uuid },

    #[error("row not found in '{table}'")]
    NotFound { table: String },

    #[error("table '{0}' does not exist")]
    MissingTable(String),

    #[error("row in '{table}' does not match the expected schema: {message}")]
    Schema { table: String, message: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Query/insert/update/delete client over named tables.
#[async_trait]
pub trait TableClient: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Insert a new row. Fails with `DuplicateKey` if the key exists.
    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError>;

    /// Replace an existing row. Fails with `NotFound` if the key is absent.
    async fn update(&self, table: &str, row: Row) -> Result<(), StoreError>;

    /// Delete one row by key. Fails with `NotFound` if the key is absent.
    async fn delete(&self, table: &str, key: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
impl<C> TableClient for Arc<C>
where
    C: TableClient + ?Sized,
{
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        (**self).select(table, query).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError> {
        (**self).insert(table, row).await
    }

    async fn update(&self, table: &str, row: Row) -> Result<(), StoreError> {
        (**self).update(table, row).await
    }

    async fn delete(&self, table: &str, key: Uuid) -> Result<(), StoreError> {
        (**self).delete(table, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_matches_scope_key_and_fields() {
        let e = EnterpriseId::new();
        let row = Row {
            key: Uuid::now_v7(),
            enterprise_id: Some(e),
            data: json!({ "unit": "A-101", "reading": 120.0 }),
        };

        assert!(Query::scoped(e).matches(&row));
        assert!(Query::scoped(e).key(row.key).eq("unit", "A-101").matches(&row));
        assert!(!Query::scoped(EnterpriseId::new()).matches(&row));
        assert!(!Query::all().eq("unit", "B-2").matches(&row));
        assert!(!Query::all().eq("missing", "x").matches(&row));
    }
}
