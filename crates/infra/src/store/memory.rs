use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Query, Row, StoreError, TableClient};

/// In-memory table client for tests/dev.
///
/// By default any table name is accepted and created on first use. A client
/// built with [`InMemoryTableClient::with_tables`] only knows the listed
/// tables and reports `MissingTable` for the rest, like a real backend whose
/// schema was not migrated.
#[derive(Debug, Default)]
pub struct InMemoryTableClient {
    // BTreeMap keeps select order stable (v7 keys sort by creation time).
    tables: RwLock<HashMap<String, BTreeMap<Uuid, Row>>>,
    known: Option<HashSet<String>>,
}

impl InMemoryTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: RwLock::new(HashMap::new()),
            known: Some(tables.into_iter().map(Into::into).collect()),
        }
    }

    fn check_table(&self, table: &str) -> Result<(), StoreError> {
        match &self.known {
            Some(known) if !known.contains(table) => Err(StoreError::MissingTable(table.to_string())),
            _ => Ok(()),
        }
    }

    /// Number of rows in `table` across all tenants.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|t| t.get(table).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl TableClient for InMemoryTableClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.check_table(table)?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables
            .get(table)
            .map(|rows| rows.values().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError> {
        self.check_table(table)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(&row.key) {
            return Err(StoreError::DuplicateKey {
                table: table.to_string(),
                key: row.key,
            });
        }
        rows.insert(row.key, row);
        Ok(())
    }

    async fn update(&self, table: &str, row: Row) -> Result<(), StoreError> {
        self.check_table(table)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        match tables.get_mut(table).and_then(|rows| rows.get_mut(&row.key)) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                table: table.to_string(),
            }),
        }
    }

    async fn delete(&self, table: &str, key: Uuid) -> Result<(), StoreError> {
        self.check_table(table)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        match tables.get_mut(table).and_then(|rows| rows.remove(&key)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                table: table.to_string(),
            }),
        }
    }
}
