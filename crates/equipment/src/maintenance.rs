use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainError, DomainResult, EnterpriseId, Entity, Record, UserId, text};

use crate::EquipmentId;

condohub_core::record_id!(
    /// Maintenance record identifier.
    MaintenanceId
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceKind {
    #[default]
    Preventive,
    Corrective,
    Inspection,
}

/// One entry of an equipment's maintenance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: MaintenanceId,
    pub enterprise_id: EnterpriseId,
    pub equipment_id: EquipmentId,
    pub performed_on: NaiveDate,
    pub kind: MaintenanceKind,
    pub description: String,
    pub performed_by: Option<String>,
    pub cost: Option<f64>,
    pub next_due_on: Option<NaiveDate>,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenance {
    #[serde(default)]
    pub performed_on: Option<NaiveDate>,
    #[serde(default)]
    pub kind: Option<MaintenanceKind>,
    pub description: String,
    #[serde(default)]
    pub performed_by: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub next_due_on: Option<NaiveDate>,
}

impl MaintenanceRecord {
    pub fn create(
        enterprise_id: EnterpriseId,
        equipment_id: EquipmentId,
        recorded_by: UserId,
        input: NewMaintenance,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = text::required("description", &input.description)?;
        if input.cost.is_some_and(|c| !c.is_finite() || c < 0.0) {
            return Err(DomainError::validation("cost must be a non-negative number"));
        }
        let performed_on = input.performed_on.unwrap_or_else(|| now.date_naive());
        if input.next_due_on.is_some_and(|d| d < performed_on) {
            return Err(DomainError::validation("next due date precedes the maintenance date"));
        }

        Ok(Self {
            id: MaintenanceId::new(),
            enterprise_id,
            equipment_id,
            performed_on,
            kind: input.kind.unwrap_or_default(),
            description,
            performed_by: text::optional(input.performed_by),
            cost: input.cost,
            next_due_on: input.next_due_on,
            recorded_by,
            created_at: now,
        })
    }
}

impl Entity for MaintenanceRecord {
    type Id = MaintenanceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for MaintenanceRecord {
    const TABLE: &'static str = "maintenance_records";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

/// Newest first.
pub fn sort_history(records: &mut [MaintenanceRecord]) {
    records.sort_by(|a, b| {
        b.performed_on
            .cmp(&a.performed_on)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// An equipment whose next maintenance falls inside the query window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDue {
    pub equipment_id: EquipmentId,
    pub last_record_id: MaintenanceId,
    pub next_due_on: NaiveDate,
    pub overdue: bool,
}

/// Equipment due for maintenance within `days` of `today` (overdue included).
///
/// Only the most recent record of each equipment counts: a later maintenance
/// supersedes the due date of an earlier one. Sorted by due date.
pub fn due_within(records: &[MaintenanceRecord], today: NaiveDate, days: u32) -> Vec<MaintenanceDue> {
    let horizon = today
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX);

    let mut latest: HashMap<EquipmentId, &MaintenanceRecord> = HashMap::new();
    for r in records {
        latest
            .entry(r.equipment_id)
            .and_modify(|cur| {
                if (r.performed_on, r.created_at) > (cur.performed_on, cur.created_at) {
                    *cur = r;
                }
            })
            .or_insert(r);
    }

    let mut due: Vec<MaintenanceDue> = latest
        .into_values()
        .filter_map(|r| {
            let next = r.next_due_on?;
            (next <= horizon).then_some(MaintenanceDue {
                equipment_id: r.equipment_id,
                last_record_id: r.id,
                next_due_on: next,
                overdue: next < today,
            })
        })
        .collect();
    due.sort_by_key(|d| (d.next_due_on, d.equipment_id));
    due
}
