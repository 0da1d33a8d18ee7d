use chrono::Utc;

use condohub_auth::{Action, Actor, Module};
use condohub_events::{AuditAction, HookList};
use condohub_suppliers::{NewSupplier, Supplier, SupplierFilter, SupplierId, SupplierPatch, sort_by_name};

use super::{GatewayResult, commit, gate};
use crate::store::Table;
use crate::tables::Tables;

#[derive(Debug, Clone)]
pub struct SupplierGateway {
    suppliers: Table<Supplier>,
    hooks: HookList,
}

impl SupplierGateway {
    pub fn new(tables: &Tables, hooks: HookList) -> Self {
        Self {
            suppliers: tables.suppliers.clone(),
            hooks,
        }
    }

    pub async fn list(&self, actor: &Actor, filter: &SupplierFilter) -> GatewayResult<Vec<Supplier>> {
        gate(actor, Module::Suppliers, Action::View, None)?;
        let mut suppliers: Vec<Supplier> = self
            .suppliers
            .list(actor.enterprise_id())
            .await?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        sort_by_name(&mut suppliers);
        Ok(suppliers)
    }

    pub async fn get(&self, actor: &Actor, id: SupplierId) -> GatewayResult<Supplier> {
        gate(actor, Module::Suppliers, Action::View, None)?;
        Ok(self
            .suppliers
            .get(Some(actor.enterprise_id()), *id.as_uuid())
            .await?)
    }

    pub async fn create(&self, actor: &Actor, input: NewSupplier) -> GatewayResult<Supplier> {
        gate(actor, Module::Suppliers, Action::Create, None)?;
        let supplier = Supplier::create(actor.enterprise_id(), input, Utc::now())?;

        self.suppliers.insert(&supplier).await?;
        tracing::info!(
            enterprise_id = %supplier.enterprise_id,
            supplier_id = %supplier.id,
            action = %AuditAction::CreateSupplier,
            "supplier created"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::CreateSupplier,
                format!("Created supplier '{}'", supplier.name),
            ))
            .await;
        Ok(supplier)
    }

    pub async fn update(&self, actor: &Actor, id: SupplierId, patch: SupplierPatch) -> GatewayResult<Supplier> {
        let mut supplier = self.get(actor, id).await?;
        gate(actor, Module::Suppliers, Action::Update, None)?;

        supplier.apply_patch(patch, Utc::now())?;
        self.suppliers.update(&supplier).await?;
        tracing::info!(
            enterprise_id = %supplier.enterprise_id,
            supplier_id = %supplier.id,
            action = %AuditAction::UpdateSupplier,
            "supplier updated"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UpdateSupplier,
                format!("Updated supplier '{}'", supplier.name),
            ))
            .await;
        Ok(supplier)
    }

    pub async fn delete(&self, actor: &Actor, id: SupplierId) -> GatewayResult<()> {
        let supplier = self.get(actor, id).await?;
        gate(actor, Module::Suppliers, Action::Delete, None)?;

        self.suppliers.delete(*supplier.id.as_uuid()).await?;
        tracing::info!(
            enterprise_id = %supplier.enterprise_id,
            supplier_id = %supplier.id,
            action = %AuditAction::DeleteSupplier,
            "supplier deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteSupplier,
                format!("Deleted supplier '{}'", supplier.name),
            ))
            .await;
        Ok(())
    }
}
