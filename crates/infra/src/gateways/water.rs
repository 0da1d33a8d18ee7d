use chrono::Utc;

use condohub_auth::{Action, Actor, Module};
use condohub_events::{AuditAction, HookList, NotificationTrigger};
use condohub_water::{
    NewReading, ReadingFilter, ReadingId, ReadingPatch, UnitSummary, WaterReading, latest_for_unit,
    sort_newest_first, summarize,
};

use super::{GatewayResult, commit, gate};
use crate::enterprise::Enterprise;
use crate::store::{StoreError, Table};
use crate::tables::Tables;

#[derive(Debug, Clone)]
pub struct WaterGateway {
    readings: Table<WaterReading>,
    enterprises: Table<Enterprise>,
    hooks: HookList,
}

impl WaterGateway {
    pub fn new(tables: &Tables, hooks: HookList) -> Self {
        Self {
            readings: tables.readings.clone(),
            enterprises: tables.enterprises.clone(),
            hooks,
        }
    }

    /// The enterprise's configured consumption limit, if any.
    async fn water_limit(&self, actor: &Actor) -> GatewayResult<Option<f64>> {
        let e = actor.enterprise_id();
        match self.enterprises.get(Some(e), *e.as_uuid()).await {
            Ok(enterprise) => Ok(enterprise.settings.water_limit),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list(&self, actor: &Actor, filter: &ReadingFilter) -> GatewayResult<Vec<WaterReading>> {
        gate(actor, Module::Water, Action::View, None)?;
        let mut readings: Vec<WaterReading> = self
            .readings
            .list(actor.enterprise_id())
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        sort_newest_first(&mut readings);
        Ok(readings)
    }

    pub async fn summary(&self, actor: &Actor) -> GatewayResult<Vec<UnitSummary>> {
        gate(actor, Module::Water, Action::View, None)?;
        let readings = self.readings.list(actor.enterprise_id()).await?;
        let limit = self.water_limit(actor).await?;
        Ok(summarize(&readings, limit))
    }

    pub async fn get(&self, actor: &Actor, id: ReadingId) -> GatewayResult<WaterReading> {
        gate(actor, Module::Water, Action::View, None)?;
        Ok(self
            .readings
            .get(Some(actor.enterprise_id()), *id.as_uuid())
            .await?)
    }

    /// Record a reading. Without an explicit previous value the unit's latest
    /// reading is used (0 for a new unit).
    pub async fn create(&self, actor: &Actor, input: NewReading) -> GatewayResult<WaterReading> {
        gate(actor, Module::Water, Action::Create, None)?;

        let existing = self.readings.list(actor.enterprise_id()).await?;
        let inferred = latest_for_unit(&existing, &input.unit).map_or(0.0, |r| r.reading);
        let reading = WaterReading::create(actor.enterprise_id(), actor.user_id(), input, inferred, Utc::now())?;
        let limit = self.water_limit(actor).await?;

        self.readings.insert(&reading).await?;
        tracing::info!(
            enterprise_id = %reading.enterprise_id,
            reading_id = %reading.id,
            unit = %reading.unit,
            consumption = reading.consumption(),
            action = %AuditAction::AddReading,
            "water reading added"
        );

        let mut event = commit(
            actor,
            AuditAction::AddReading,
            format!(
                "Reading {} for unit {} (consumption {})",
                reading.reading,
                reading.unit,
                reading.consumption()
            ),
        );
        if let Some(limit) = limit {
            event = event.with_trigger(NotificationTrigger::HighConsumption {
                reading_id: *reading.id.as_uuid(),
                unit: reading.unit.clone(),
                consumption: reading.consumption(),
                limit,
            });
        }
        self.hooks.dispatch(event).await;
        Ok(reading)
    }

    pub async fn update(&self, actor: &Actor, id: ReadingId, patch: ReadingPatch) -> GatewayResult<WaterReading> {
        let mut reading = self.get(actor, id).await?;
        gate(actor, Module::Water, Action::Update, None)?;

        reading.apply_patch(patch, Utc::now())?;
        self.readings.update(&reading).await?;
        tracing::info!(
            enterprise_id = %reading.enterprise_id,
            reading_id = %reading.id,
            action = %AuditAction::UpdateReading,
            "water reading updated"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UpdateReading,
                format!("Updated reading for unit {}", reading.unit),
            ))
            .await;
        Ok(reading)
    }

    pub async fn delete(&self, actor: &Actor, id: ReadingId) -> GatewayResult<()> {
        let reading = self.get(actor, id).await?;
        gate(actor, Module::Water, Action::Delete, None)?;

        self.readings.delete(*reading.id.as_uuid()).await?;
        tracing::info!(
            enterprise_id = %reading.enterprise_id,
            reading_id = %reading.id,
            action = %AuditAction::DeleteReading,
            "water reading deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteReading,
                format!("Deleted reading for unit {}", reading.unit),
            ))
            .await;
        Ok(())
    }
}
