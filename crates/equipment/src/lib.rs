//! Equipment registry: categories with declared attributes, equipment items,
//! and their maintenance history.

pub mod category;
pub mod equipment;
pub mod maintenance;

pub use category::{CategoryId, CategoryPatch, EquipmentCategory, NewCategory, ensure_unique_name};
pub use equipment::{
    Equipment, EquipmentFilter, EquipmentId, EquipmentPatch, EquipmentStatus, NewEquipment, sort_by_name,
};
pub use maintenance::{
    MaintenanceDue, MaintenanceId, MaintenanceKind, MaintenanceRecord, NewMaintenance, due_within,
    sort_history,
};
