use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainError, DomainResult, EnterpriseId, Entity, Record, text};

use crate::{CategoryId, EquipmentCategory};

condohub_core::record_id!(
    /// Equipment identifier.
    EquipmentId
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    #[default]
    Operational,
    NeedsMaintenance,
    OutOfService,
}

/// A piece of equipment.
///
/// # Invariants
/// - When `category_id` is set, every attribute name is declared by that
///   category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: EquipmentId,
    pub enterprise_id: EnterpriseId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub location: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub installed_on: Option<NaiveDate>,
    pub status: EquipmentStatus,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEquipment {
    pub name: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub installed_on: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<EquipmentStatus>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub manufacturer: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub installed_on: Option<Option<NaiveDate>>,
    pub status: Option<EquipmentStatus>,
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub notes: Option<Option<String>>,
}

/// Check attribute names against the category, trimming keys and values.
///
/// `category` must be the category named by `category_id` (the caller loads
/// it); passing `None` while `category_id` is set is an error.
fn checked_attributes(
    attributes: BTreeMap<String, String>,
    category_id: Option<CategoryId>,
    category: Option<&EquipmentCategory>,
) -> DomainResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for (name, value) in attributes {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("attribute name cannot be empty"));
        }
        out.insert(name, value.trim().to_string());
    }

    let Some(category_id) = category_id else {
        return Ok(out);
    };
    let category = match category {
        Some(c) if c.id == category_id => c,
        _ => return Err(DomainError::validation(format!("unknown category {category_id}"))),
    };
    if let Some(undeclared) = out.keys().find(|name| !category.declares(name)) {
        return Err(DomainError::validation(format!(
            "attribute '{undeclared}' is not declared by category '{}'",
            category.name
        )));
    }
    Ok(out)
}

impl Equipment {
    pub fn create(
        enterprise_id: EnterpriseId,
        input: NewEquipment,
        category: Option<&EquipmentCategory>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = text::required("name", &input.name)?;
        let attributes = checked_attributes(input.attributes, input.category_id, category)?;

        Ok(Self {
            id: EquipmentId::new(),
            enterprise_id,
            name,
            category_id: input.category_id,
            location: text::optional(input.location),
            manufacturer: text::optional(input.manufacturer),
            model: text::optional(input.model),
            serial_number: text::optional(input.serial_number),
            installed_on: input.installed_on,
            status: input.status.unwrap_or_default(),
            attributes,
            notes: text::optional(input.notes),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch. `category` is the category in effect after the patch.
    pub fn apply_patch(
        &mut self,
        patch: EquipmentPatch,
        category: Option<&EquipmentCategory>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let name = patch.name.as_deref().map(|n| text::required("name", n)).transpose()?;
        let category_id = patch.category_id.unwrap_or(self.category_id);
        let attributes = checked_attributes(
            patch.attributes.unwrap_or_else(|| self.attributes.clone()),
            category_id,
            category,
        )?;

        if let Some(name) = name {
            self.name = name;
        }
        self.category_id = category_id;
        self.attributes = attributes;
        if let Some(v) = patch.location {
            self.location = text::optional(v);
        }
        if let Some(v) = patch.manufacturer {
            self.manufacturer = text::optional(v);
        }
        if let Some(v) = patch.model {
            self.model = text::optional(v);
        }
        if let Some(v) = patch.serial_number {
            self.serial_number = text::optional(v);
        }
        if let Some(v) = patch.installed_on {
            self.installed_on = v;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(v) = patch.notes {
            self.notes = text::optional(v);
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Equipment {
    type Id = EquipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Equipment {
    const TABLE: &'static str = "equipment";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFilter {
    pub category_id: Option<CategoryId>,
    pub status: Option<EquipmentStatus>,
    /// Matches name, location, manufacturer, model and serial number.
    pub search: Option<String>,
}

impl EquipmentFilter {
    pub fn matches(&self, e: &Equipment) -> bool {
        if self.category_id.is_some() && self.category_id != e.category_id {
            return false;
        }
        if self.status.is_some_and(|s| s != e.status) {
            return false;
        }
        let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        text::contains_ci(&e.name, q)
            || [&e.location, &e.manufacturer, &e.model, &e.serial_number]
                .into_iter()
                .flatten()
                .any(|field| text::contains_ci(field, q))
    }
}

pub fn sort_by_name(items: &mut [Equipment]) {
    items.sort_by_key(|e| e.name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewCategory;

    fn pumps() -> EquipmentCategory {
        EquipmentCategory::create(
            EnterpriseId::new(),
            NewCategory {
                name: "Pumps".into(),
                attributes: vec!["flow rate".into(), "voltage".into()],
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn input(name: &str, category: Option<&EquipmentCategory>, attrs: &[(&str, &str)]) -> NewEquipment {
        NewEquipment {
            name: name.into(),
            category_id: category.map(|c| c.id),
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn declared_attributes_are_accepted() {
        let c = pumps();
        let e = Equipment::create(
            c.enterprise_id,
            input("Main pump", Some(&c), &[("flow rate", "20 m3/h")]),
            Some(&c),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(e.attributes.get("flow rate").map(String::as_str), Some("20 m3/h"));
        assert_eq!(e.status, EquipmentStatus::Operational);
    }

    #[test]
    fn undeclared_attribute_is_rejected() {
        let c = pumps();
        let err = Equipment::create(
            c.enterprise_id,
            input("Main pump", Some(&c), &[("pressure", "3 bar")]),
            Some(&c),
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not declared"));
    }

    #[test]
    fn category_must_be_supplied_when_referenced() {
        let c = pumps();
        assert!(Equipment::create(c.enterprise_id, input("Main pump", Some(&c), &[]), None, Utc::now()).is_err());
    }

    #[test]
    fn uncategorized_equipment_takes_any_attribute() {
        let e = Equipment::create(
            EnterpriseId::new(),
            input("Gate motor", None, &[("brand", "Acme")]),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(e.attributes.len(), 1);
    }

    #[test]
    fn clearing_category_via_patch_keeps_attributes_free() {
        let c = pumps();
        let mut e = Equipment::create(
            c.enterprise_id,
            input("Main pump", Some(&c), &[("voltage", "220")]),
            Some(&c),
            Utc::now(),
        )
        .unwrap();

        let patch: EquipmentPatch = serde_json::from_str(r#"{"categoryId":null,"status":"OUT_OF_SERVICE"}"#).unwrap();
        e.apply_patch(patch, None, Utc::now()).unwrap();
        assert_eq!(e.category_id, None);
        assert_eq!(e.status, EquipmentStatus::OutOfService);
    }

    #[test]
    fn search_covers_secondary_fields() {
        let mut i = input("Main pump", None, &[]);
        i.serial_number = Some("SN-4411".into());
        let e = Equipment::create(EnterpriseId::new(), i, None, Utc::now()).unwrap();

        let f = EquipmentFilter {
            search: Some("sn-44".into()),
            ..Default::default()
        };
        assert!(f.matches(&e));
    }
}
