use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use condohub_core::{DomainError, DomainResult, EnterpriseId, Entity, Record, text};

/// A condominium: the tenant every other record belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enterprise {
    pub id: EnterpriseId,
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub settings: EnterpriseSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-enterprise settings blob.
///
/// Only `waterLimit` is interpreted; every other key is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_limit: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl EnterpriseSettings {
    pub fn validate(&self) -> DomainResult<()> {
        if self.water_limit.is_some_and(|l| !l.is_finite() || l < 0.0) {
            return Err(DomainError::validation("waterLimit must be a non-negative number"));
        }
        Ok(())
    }
}

impl Enterprise {
    pub fn create(name: &str, address: Option<String>, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: EnterpriseId::new(),
            name: text::required("name", name)?,
            address: text::optional(address),
            settings: EnterpriseSettings::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the settings blob.
    pub fn replace_settings(&mut self, settings: EnterpriseSettings, now: DateTime<Utc>) -> DomainResult<()> {
        settings.validate()?;
        self.settings = settings;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Enterprise {
    type Id = EnterpriseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Enterprise {
    const TABLE: &'static str = "enterprises";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.id)
    }
}
