//! Entity and record traits: identity + how an entity is stored.

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::EnterpriseId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity persisted as one row of a remote table.
///
/// Rows are stored as JSON documents whose field names come from serde
/// (camelCase in memory maps to the table's column naming). The row key is
/// the entity id as a UUID; `enterprise_id` scopes the row to a tenant and is
/// `None` only for global rows such as user accounts.
pub trait Record: Entity + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Remote table name.
    const TABLE: &'static str;

    /// Row key.
    fn key(&self) -> Uuid;

    /// Owning enterprise, if the row is tenant-scoped.
    fn enterprise_id(&self) -> Option<EnterpriseId>;
}
