use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainError, DomainResult, EnterpriseId, Entity, Record, text};

condohub_core::record_id!(
    /// Equipment category identifier.
    CategoryId
);

/// A category declares which attribute names its equipment may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentCategory {
    pub id: CategoryId,
    pub enterprise_id: EnterpriseId,
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub attributes: Option<Vec<String>>,
}

/// Trim attribute names, drop blanks, reject case-insensitive duplicates.
fn attribute_names(raw: Vec<String>) -> DomainResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if out.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return Err(DomainError::validation(format!("duplicate attribute '{name}'")));
        }
        out.push(name.to_string());
    }
    Ok(out)
}

impl EquipmentCategory {
    pub fn create(enterprise_id: EnterpriseId, input: NewCategory, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: CategoryId::new(),
            enterprise_id,
            name: text::required("name", &input.name)?,
            attributes: attribute_names(input.attributes)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: CategoryPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let name = patch.name.as_deref().map(|n| text::required("name", n)).transpose()?;
        let attributes = patch.attributes.map(attribute_names).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(attributes) = attributes {
            self.attributes = attributes;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn declares(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a.eq_ignore_ascii_case(attribute.trim()))
    }
}

/// Category names are unique per enterprise (case-insensitive).
///
/// `except` skips the category being renamed.
pub fn ensure_unique_name(
    existing: &[EquipmentCategory],
    name: &str,
    except: Option<CategoryId>,
) -> DomainResult<()> {
    let name = name.trim();
    let taken = existing
        .iter()
        .filter(|c| Some(c.id) != except)
        .any(|c| c.name.eq_ignore_ascii_case(name));
    if taken {
        return Err(DomainError::conflict(format!("category '{name}' already exists")));
    }
    Ok(())
}

impl Entity for EquipmentCategory {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for EquipmentCategory {
    const TABLE: &'static str = "equipment_categories";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, attrs: &[&str]) -> DomainResult<EquipmentCategory> {
        EquipmentCategory::create(
            EnterpriseId::new(),
            NewCategory {
                name: name.into(),
                attributes: attrs.iter().map(|s| s.to_string()).collect(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn attributes_are_trimmed_and_blanks_dropped() {
        let c = category("Pumps", &[" flow rate ", "", "voltage"]).unwrap();
        assert_eq!(c.attributes, vec!["flow rate", "voltage"]);
        assert!(c.declares("Flow Rate"));
        assert!(!c.declares("pressure"));
    }

    #[test]
    fn duplicate_attribute_rejected() {
        assert!(category("Pumps", &["power", "POWER"]).is_err());
    }

    #[test]
    fn unique_name_ignores_the_renamed_category() {
        let pumps = category("Pumps", &[]).unwrap();
        let existing = vec![pumps.clone()];

        assert!(matches!(
            ensure_unique_name(&existing, " pumps ", None),
            Err(DomainError::Conflict(_))
        ));
        assert!(ensure_unique_name(&existing, "Pumps", Some(pumps.id)).is_ok());
        assert!(ensure_unique_name(&existing, "Elevators", None).is_ok());
    }
}
