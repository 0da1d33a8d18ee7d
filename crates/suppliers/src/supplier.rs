use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainError, DomainResult, EnterpriseId, Entity, Record, text};

condohub_core::record_id!(
    /// Supplier identifier (enterprise-scoped via `enterprise_id`).
    SupplierId
);

/// Contact information for a supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ContactInfo {
    fn normalized(self) -> DomainResult<Self> {
        let email = text::optional(self.email).map(|e| e.to_lowercase());
        if email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err(DomainError::validation("invalid contact email"));
        }
        Ok(Self {
            email,
            phone: text::optional(self.phone),
            address: text::optional(self.address),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub enterprise_id: EnterpriseId,
    pub name: String,
    pub service_type: Option<String>,
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact: ContactInfo,
    pub tax_id: Option<String>,
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact: Option<ContactInfo>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. `None` keeps the existing value; `null` clears optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub service_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub contact_name: Option<Option<String>>,
    pub contact: Option<ContactInfo>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub tax_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub rating: Option<Option<u8>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub notes: Option<Option<String>>,
}

fn checked_rating(rating: Option<u8>) -> DomainResult<Option<u8>> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(DomainError::validation("rating must be between 1 and 5")),
        other => Ok(other),
    }
}

impl Supplier {
    pub fn create(enterprise_id: EnterpriseId, input: NewSupplier, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self {
            id: SupplierId::new(),
            enterprise_id,
            name: input.name.trim().to_string(),
            service_type: text::optional(input.service_type),
            contact_name: text::optional(input.contact_name),
            contact: input.contact.unwrap_or_default().normalized()?,
            tax_id: text::optional(input.tax_id),
            rating: checked_rating(input.rating)?,
            notes: text::optional(input.notes),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: SupplierPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let new_name = patch.name.unwrap_or_else(|| self.name.clone());
        if new_name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let contact = patch.contact.map(ContactInfo::normalized).transpose()?;
        let rating = patch.rating.map(checked_rating).transpose()?;

        self.name = new_name.trim().to_string();
        if let Some(contact) = contact {
            self.contact = contact;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(v) = patch.service_type {
            self.service_type = text::optional(v);
        }
        if let Some(v) = patch.contact_name {
            self.contact_name = text::optional(v);
        }
        if let Some(v) = patch.tax_id {
            self.tax_id = text::optional(v);
        }
        if let Some(v) = patch.notes {
            self.notes = text::optional(v);
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Supplier {
    const TABLE: &'static str = "suppliers";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierFilter {
    pub service_type: Option<String>,
    /// Matches name, contact name and contact email.
    pub search: Option<String>,
}

impl SupplierFilter {
    pub fn matches(&self, s: &Supplier) -> bool {
        if let Some(kind) = self.service_type.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            if !s.service_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(kind)) {
                return false;
            }
        }
        let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        text::contains_ci(&s.name, q)
            || s.contact_name.as_deref().is_some_and(|n| text::contains_ci(n, q))
            || s.contact.email.as_deref().is_some_and(|e| text::contains_ci(e, q))
    }
}

pub fn sort_by_name(suppliers: &mut [Supplier]) {
    suppliers.sort_by_key(|s| s.name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn create_rejects_empty_name() {
        let err = Supplier::create(EnterpriseId::new(), input("   "), Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn contact_email_is_normalized_and_checked() {
        let mut i = input("Acme Plumbing");
        i.contact = Some(ContactInfo {
            email: Some(" Ops@Acme.COM ".into()),
            phone: Some("  ".into()),
            address: None,
        });
        let s = Supplier::create(EnterpriseId::new(), i, Utc::now()).unwrap();
        assert_eq!(s.contact.email.as_deref(), Some("ops@acme.com"));
        assert_eq!(s.contact.phone, None);

        let mut bad = input("Acme Plumbing");
        bad.contact = Some(ContactInfo {
            email: Some("not-an-email".into()),
            ..Default::default()
        });
        assert!(Supplier::create(EnterpriseId::new(), bad, Utc::now()).is_err());
    }

    #[test]
    fn update_details_updates_name_and_contact() {
        let mut s = Supplier::create(EnterpriseId::new(), input("Old Name"), Utc::now()).unwrap();
        let new_contact = ContactInfo {
            email: Some("new@example.com".to_string()),
            phone: Some("+987654321".to_string()),
            address: None,
        };

        s.apply_patch(
            SupplierPatch {
                name: Some("New Name".to_string()),
                contact: Some(new_contact.clone()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(s.name, "New Name");
        assert_eq!(s.contact, new_contact);
    }

    #[test]
    fn null_rating_clears_it() {
        let mut i = input("Acme");
        i.rating = Some(4);
        let mut s = Supplier::create(EnterpriseId::new(), i, Utc::now()).unwrap();

        let patch: SupplierPatch = serde_json::from_str(r#"{"rating":null}"#).unwrap();
        s.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(s.rating, None);
    }

    #[test]
    fn filter_and_sort_by_name() {
        let mut a = Supplier::create(EnterpriseId::new(), input("zeta Elevators"), Utc::now()).unwrap();
        a.service_type = Some("Elevators".into());
        let b = Supplier::create(EnterpriseId::new(), input("Alpha Gardens"), Utc::now()).unwrap();

        let f = SupplierFilter {
            service_type: Some("elevators".into()),
            search: None,
        };
        assert!(f.matches(&a));
        assert!(!f.matches(&b));

        let mut all = vec![a, b];
        sort_by_name(&mut all);
        assert_eq!(all[0].name, "Alpha Gardens");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: only ratings 1..=5 are accepted.
        #[test]
        fn rating_bounds(r in any::<u8>()) {
            let mut i = input("Acme");
            i.rating = Some(r);
            let result = Supplier::create(EnterpriseId::new(), i, Utc::now());
            prop_assert_eq!(result.is_ok(), (1..=5).contains(&r));
        }
    }
}
