use std::sync::Arc;

use condohub_auth::{Membership, UserAccount};
use condohub_documents::Document;
use condohub_equipment::{Equipment, EquipmentCategory, MaintenanceRecord};
use condohub_structural::{IssuePhoto, StructuralIssue};
use condohub_suppliers::Supplier;
use condohub_tasks::Task;
use condohub_water::WaterReading;

use crate::audit::AuditLogEntry;
use crate::enterprise::Enterprise;
use crate::store::{Table, TableClient};

/// Every typed table, all sharing one client.
#[derive(Clone, Debug)]
pub struct Tables {
    pub enterprises: Table<Enterprise>,
    pub users: Table<UserAccount>,
    pub memberships: Table<Membership>,
    pub tasks: Table<Task>,
    pub readings: Table<WaterReading>,
    pub categories: Table<EquipmentCategory>,
    pub equipment: Table<Equipment>,
    pub maintenance: Table<MaintenanceRecord>,
    pub issues: Table<StructuralIssue>,
    pub photos: Table<IssuePhoto>,
    pub documents: Table<Document>,
    pub suppliers: Table<Supplier>,
    pub audit_logs: Table<AuditLogEntry>,
}

impl Tables {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            enterprises: Table::new(client.clone()),
            users: Table::new(client.clone()),
            memberships: Table::new(client.clone()),
            tasks: Table::new(client.clone()),
            readings: Table::new(client.clone()),
            categories: Table::new(client.clone()),
            equipment: Table::new(client.clone()),
            maintenance: Table::new(client.clone()),
            issues: Table::new(client.clone()),
            photos: Table::new(client.clone()),
            documents: Table::new(client.clone()),
            suppliers: Table::new(client.clone()),
            audit_logs: Table::new(client),
        }
    }

    /// Names of every table, for strict in-memory clients and diagnostics.
    pub const NAMES: [&'static str; 13] = [
        "enterprises",
        "users",
        "memberships",
        "tasks",
        "water_readings",
        "equipment_categories",
        "equipment",
        "maintenance_records",
        "structural_issues",
        "issue_photos",
        "documents",
        "suppliers",
        "audit_logs",
    ];
}
