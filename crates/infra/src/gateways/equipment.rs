use chrono::Utc;

use condohub_auth::{Action, Actor, Module};
use condohub_equipment::{
    CategoryId, CategoryPatch, Equipment, EquipmentCategory, EquipmentFilter, EquipmentId, EquipmentPatch,
    MaintenanceDue, MaintenanceId, MaintenanceRecord, NewCategory, NewEquipment, NewMaintenance, due_within,
    ensure_unique_name, sort_by_name, sort_history,
};
use condohub_core::DomainError;
use condohub_events::{AuditAction, HookList};

use super::{GatewayResult, commit, gate};
use crate::store::{Query, StoreError, Table};
use crate::tables::Tables;

#[derive(Debug, Clone)]
pub struct EquipmentGateway {
    equipment: Table<Equipment>,
    categories: Table<EquipmentCategory>,
    maintenance: Table<MaintenanceRecord>,
    hooks: HookList,
}

impl EquipmentGateway {
    pub fn new(tables: &Tables, hooks: HookList) -> Self {
        Self {
            equipment: tables.equipment.clone(),
            categories: tables.categories.clone(),
            maintenance: tables.maintenance.clone(),
            hooks,
        }
    }

    // Categories

    pub async fn list_categories(&self, actor: &Actor) -> GatewayResult<Vec<EquipmentCategory>> {
        gate(actor, Module::Equipment, Action::View, None)?;
        let mut categories = self.categories.list(actor.enterprise_id()).await?;
        categories.sort_by_key(|c| c.name.to_lowercase());
        Ok(categories)
    }

    pub async fn create_category(&self, actor: &Actor, input: NewCategory) -> GatewayResult<EquipmentCategory> {
        gate(actor, Module::Equipment, Action::ManageCategories, None)?;
        let category = EquipmentCategory::create(actor.enterprise_id(), input, Utc::now())?;
        let existing = self.categories.list(actor.enterprise_id()).await?;
        ensure_unique_name(&existing, &category.name, None)?;

        self.categories.insert(&category).await?;
        tracing::info!(
            enterprise_id = %category.enterprise_id,
            category_id = %category.id,
            action = %AuditAction::CreateCategory,
            "equipment category created"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::CreateCategory,
                format!("Created category '{}'", category.name),
            ))
            .await;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        actor: &Actor,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> GatewayResult<EquipmentCategory> {
        gate(actor, Module::Equipment, Action::ManageCategories, None)?;
        let existing = self.categories.list(actor.enterprise_id()).await?;
        let mut category = existing
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                table: "equipment_categories".to_string(),
            })?;

        category.apply_patch(patch, Utc::now())?;
        ensure_unique_name(&existing, &category.name, Some(category.id))?;

        self.categories.update(&category).await?;
        tracing::info!(
            enterprise_id = %category.enterprise_id,
            category_id = %category.id,
            action = %AuditAction::UpdateCategory,
            "equipment category updated"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UpdateCategory,
                format!("Updated category '{}'", category.name),
            ))
            .await;
        Ok(category)
    }

    /// Categories still referenced by equipment cannot be deleted.
    pub async fn delete_category(&self, actor: &Actor, id: CategoryId) -> GatewayResult<()> {
        gate(actor, Module::Equipment, Action::ManageCategories, None)?;
        let category = self
            .categories
            .get(Some(actor.enterprise_id()), *id.as_uuid())
            .await?;

        let in_use = self
            .equipment
            .find(&Query::scoped(actor.enterprise_id()).eq("categoryId", id.to_string()))
            .await?;
        if !in_use.is_empty() {
            return Err(DomainError::conflict(format!(
                "category '{}' is used by {} equipment item(s)",
                category.name,
                in_use.len()
            ))
            .into());
        }

        self.categories.delete(*category.id.as_uuid()).await?;
        tracing::info!(
            enterprise_id = %category.enterprise_id,
            category_id = %category.id,
            action = %AuditAction::DeleteCategory,
            "equipment category deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteCategory,
                format!("Deleted category '{}'", category.name),
            ))
            .await;
        Ok(())
    }

    /// Load a category for validation; a missing one is left to the domain
    /// constructor to report.
    async fn category(&self, actor: &Actor, id: Option<CategoryId>) -> GatewayResult<Option<EquipmentCategory>> {
        let Some(id) = id else {
            return Ok(None);
        };
        match self.categories.get(Some(actor.enterprise_id()), *id.as_uuid()).await {
            Ok(c) => Ok(Some(c)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Equipment

    pub async fn list(&self, actor: &Actor, filter: &EquipmentFilter) -> GatewayResult<Vec<Equipment>> {
        gate(actor, Module::Equipment, Action::View, None)?;
        let mut items: Vec<Equipment> = self
            .equipment
            .list(actor.enterprise_id())
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        sort_by_name(&mut items);
        Ok(items)
    }

    pub async fn get(&self, actor: &Actor, id: EquipmentId) -> GatewayResult<Equipment> {
        gate(actor, Module::Equipment, Action::View, None)?;
        Ok(self
            .equipment
            .get(Some(actor.enterprise_id()), *id.as_uuid())
            .await?)
    }

    pub async fn create(&self, actor: &Actor, input: NewEquipment) -> GatewayResult<Equipment> {
        gate(actor, Module::Equipment, Action::Create, None)?;
        let category = self.category(actor, input.category_id).await?;
        let item = Equipment::create(actor.enterprise_id(), input, category.as_ref(), Utc::now())?;

        self.equipment.insert(&item).await?;
        tracing::info!(
            enterprise_id = %item.enterprise_id,
            equipment_id = %item.id,
            action = %AuditAction::CreateEquipment,
            "equipment created"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::CreateEquipment,
                format!("Created equipment '{}'", item.name),
            ))
            .await;
        Ok(item)
    }

    pub async fn update(&self, actor: &Actor, id: EquipmentId, patch: EquipmentPatch) -> GatewayResult<Equipment> {
        let mut item = self.get(actor, id).await?;
        gate(actor, Module::Equipment, Action::Update, None)?;

        let category_id = patch.category_id.unwrap_or(item.category_id);
        let category = self.category(actor, category_id).await?;
        item.apply_patch(patch, category.as_ref(), Utc::now())?;

        self.equipment.update(&item).await?;
        tracing::info!(
            enterprise_id = %item.enterprise_id,
            equipment_id = %item.id,
            action = %AuditAction::UpdateEquipment,
            "equipment updated"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UpdateEquipment,
                format!("Updated equipment '{}'", item.name),
            ))
            .await;
        Ok(item)
    }

    /// Delete equipment, then its maintenance history.
    ///
    /// The history rows are removed with independent calls; a failure there is
    /// logged and leaves orphaned rows behind.
    pub async fn delete(&self, actor: &Actor, id: EquipmentId) -> GatewayResult<()> {
        let item = self.get(actor, id).await?;
        gate(actor, Module::Equipment, Action::Delete, None)?;

        self.equipment.delete(*item.id.as_uuid()).await?;

        let history = self
            .maintenance
            .find(&Query::scoped(actor.enterprise_id()).eq("equipmentId", id.to_string()))
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(equipment_id = %id, error = %err, "could not list maintenance history");
                Vec::new()
            });
        for record in &history {
            if let Err(err) = self.maintenance.delete(*record.id.as_uuid()).await {
                tracing::warn!(
                    equipment_id = %id,
                    maintenance_id = %record.id,
                    error = %err,
                    "maintenance record left behind"
                );
            }
        }
        tracing::info!(
            enterprise_id = %item.enterprise_id,
            equipment_id = %item.id,
            maintenance_records = history.len(),
            action = %AuditAction::DeleteEquipment,
            "equipment deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteEquipment,
                format!("Deleted equipment '{}'", item.name),
            ))
            .await;
        Ok(())
    }

    // Maintenance

    /// Newest first.
    pub async fn history(&self, actor: &Actor, id: EquipmentId) -> GatewayResult<Vec<MaintenanceRecord>> {
        let item = self.get(actor, id).await?;
        let mut records = self
            .maintenance
            .find(&Query::scoped(actor.enterprise_id()).eq("equipmentId", item.id.to_string()))
            .await?;
        sort_history(&mut records);
        Ok(records)
    }

    pub async fn add_maintenance(
        &self,
        actor: &Actor,
        id: EquipmentId,
        input: NewMaintenance,
    ) -> GatewayResult<MaintenanceRecord> {
        let item = self.get(actor, id).await?;
        gate(actor, Module::Equipment, Action::Create, None)?;
        let record = MaintenanceRecord::create(actor.enterprise_id(), item.id, actor.user_id(), input, Utc::now())?;

        self.maintenance.insert(&record).await?;
        tracing::info!(
            enterprise_id = %record.enterprise_id,
            equipment_id = %item.id,
            maintenance_id = %record.id,
            action = %AuditAction::AddMaintenance,
            "maintenance recorded"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::AddMaintenance,
                format!("Maintenance on '{}': {}", item.name, record.description),
            ))
            .await;
        Ok(record)
    }

    pub async fn delete_maintenance(
        &self,
        actor: &Actor,
        equipment_id: EquipmentId,
        record_id: MaintenanceId,
    ) -> GatewayResult<()> {
        gate(actor, Module::Equipment, Action::Delete, None)?;
        let record = self
            .maintenance
            .get(Some(actor.enterprise_id()), *record_id.as_uuid())
            .await?;
        if record.equipment_id != equipment_id {
            return Err(StoreError::NotFound {
                table: "maintenance_records".to_string(),
            }
            .into());
        }

        self.maintenance.delete(*record.id.as_uuid()).await?;
        tracing::info!(
            enterprise_id = %record.enterprise_id,
            equipment_id = %equipment_id,
            maintenance_id = %record.id,
            action = %AuditAction::DeleteMaintenance,
            "maintenance record deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteMaintenance,
                format!("Deleted maintenance record from {}", record.performed_on),
            ))
            .await;
        Ok(())
    }

    /// Equipment whose next maintenance falls within `days` from today.
    pub async fn maintenance_due(&self, actor: &Actor, days: u32) -> GatewayResult<Vec<MaintenanceDue>> {
        gate(actor, Module::Equipment, Action::View, None)?;
        let records = self.maintenance.list(actor.enterprise_id()).await?;
        Ok(due_within(&records, Utc::now().date_naive(), days))
    }
}
