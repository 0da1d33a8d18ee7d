use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use condohub_core::{EnterpriseId, Record};

use super::{Query, Row, StoreError, TableClient};

/// Typed view of one table.
///
/// Encodes records with serde on the way in and decodes them on the way out;
/// a row that no longer decodes is a `Schema` error rather than being skipped.
pub struct Table<R> {
    client: Arc<dyn TableClient>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Table<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> core::fmt::Debug for Table<R>
where
    R: Record,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Table").field("name", &R::TABLE).finish()
    }
}

impl<R: Record> Table<R> {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    fn encode(record: &R) -> Result<Row, StoreError> {
        let data = serde_json::to_value(record).map_err(|e| StoreError::Schema {
            table: R::TABLE.to_string(),
            message: e.to_string(),
        })?;
        Ok(Row {
            key: record.key(),
            enterprise_id: record.enterprise_id(),
            data,
        })
    }

    fn decode(row: Row) -> Result<R, StoreError> {
        serde_json::from_value(row.data).map_err(|e| StoreError::Schema {
            table: R::TABLE.to_string(),
            message: e.to_string(),
        })
    }

    pub async fn find(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        self.client
            .select(R::TABLE, query)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Every row of the enterprise.
    pub async fn list(&self, enterprise_id: EnterpriseId) -> Result<Vec<R>, StoreError> {
        self.find(&Query::scoped(enterprise_id)).await
    }

    /// One row by key, scoped to `enterprise_id` when given.
    ///
    /// A row owned by another enterprise is reported as `NotFound`.
    pub async fn get(&self, enterprise_id: Option<EnterpriseId>, key: Uuid) -> Result<R, StoreError> {
        let query = Query {
            enterprise_id,
            key: Some(key),
            eq: Vec::new(),
        };
        self.find(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                table: R::TABLE.to_string(),
            })
    }

    pub async fn insert(&self, record: &R) -> Result<(), StoreError> {
        self.client.insert(R::TABLE, Self::encode(record)?).await
    }

    pub async fn update(&self, record: &R) -> Result<(), StoreError> {
        self.client.update(R::TABLE, Self::encode(record)?).await
    }

    pub async fn delete(&self, key: Uuid) -> Result<(), StoreError> {
        self.client.delete(R::TABLE, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTableClient;
    use chrono::Utc;
    use condohub_suppliers::{NewSupplier, Supplier};
    use serde_json::json;

    fn supplier(e: EnterpriseId, name: &str) -> Supplier {
        Supplier::create(
            e,
            NewSupplier {
                name: name.into(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn typed_round_trip_through_client() {
        let client: Arc<dyn TableClient> = Arc::new(InMemoryTableClient::new());
        let table: Table<Supplier> = Table::new(client);
        let e = EnterpriseId::new();
        let s = supplier(e, "Acme");

        table.insert(&s).await.unwrap();
        assert_eq!(table.get(Some(e), s.key()).await.unwrap(), s);
        assert_eq!(table.list(e).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn foreign_enterprise_row_is_not_found() {
        let client: Arc<dyn TableClient> = Arc::new(InMemoryTableClient::new());
        let table: Table<Supplier> = Table::new(client);
        let s = supplier(EnterpriseId::new(), "Acme");
        table.insert(&s).await.unwrap();

        assert!(matches!(
            table.get(Some(EnterpriseId::new()), s.key()).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn undecodable_row_is_a_schema_error() {
        let client = Arc::new(InMemoryTableClient::new());
        let e = EnterpriseId::new();
        client
            .insert(
                "suppliers",
                Row {
                    key: Uuid::now_v7(),
                    enterprise_id: Some(e),
                    data: json!({ "name": 42 }),
                },
            )
            .await
            .unwrap();

        let table: Table<Supplier> = Table::new(client);
        assert!(matches!(table.list(e).await, Err(StoreError::Schema { .. })));
    }
}
