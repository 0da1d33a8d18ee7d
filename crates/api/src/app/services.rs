use std::sync::Arc;

use anyhow::Context;

use condohub_events::{DispatchMode, HookList};
use condohub_infra::{
    AuditLogger, Gateways, IdentityService, InMemoryTableClient, LoggingNotificationSink, NotificationDispatcher,
    PostgresTableClient, Settings, StoreBackend, TableClient, Tables,
};

/// Everything a request handler needs.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub identity: Arc<IdentityService>,
    pub gateways: Gateways,
}

/// Connect the store, wire the post-commit hooks and seed the first
/// enterprise when bootstrap settings are present.
pub async fn build_services(settings: &Settings) -> anyhow::Result<AppServices> {
    let client = connect_store(settings).await?;
    let tables = Tables::new(client.clone());

    let identity = Arc::new(IdentityService::new(
        &tables,
        settings.auth.password_pepper.clone(),
        settings.auth.session_ttl(),
    ));

    let mode = if settings.hooks.detached {
        DispatchMode::Detached
    } else {
        DispatchMode::Inline
    };
    let hooks = HookList::new(mode)
        .with(Arc::new(AuditLogger::new(client.clone())))
        .with(Arc::new(NotificationDispatcher::new(
            client,
            Arc::new(LoggingNotificationSink),
        )));

    if let Some(bootstrap) = &settings.bootstrap {
        let created = identity
            .bootstrap(bootstrap)
            .await
            .context("failed to bootstrap the first enterprise")?;
        match created {
            Some(enterprise) => tracing::info!(
                enterprise_id = %enterprise.id,
                admin = %bootstrap.admin_email,
                "bootstrapped enterprise"
            ),
            None => tracing::debug!("enterprises already exist; bootstrap skipped"),
        }
    }

    let gateways = Gateways::new(&tables, identity.clone(), hooks);
    Ok(AppServices { identity, gateways })
}

async fn connect_store(settings: &Settings) -> anyhow::Result<Arc<dyn TableClient>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Ok(Arc::new(InMemoryTableClient::with_tables(Tables::NAMES)))
        }
        StoreBackend::Postgres => {
            let url = settings
                .store
                .database_url
                .as_deref()
                .context("store.database_url is required for the postgres backend")?;
            let client = PostgresTableClient::connect(url, settings.store.max_connections)
                .await
                .context("failed to connect to postgres")?;
            client.ensure_schema().await.context("failed to prepare the schema")?;
            tracing::info!(max_connections = settings.store.max_connections, "connected to postgres");
            Ok(Arc::new(client))
        }
    }
}
