//! Infrastructure layer: table store, configuration, identity, post-commit
//! hooks and the per-module gateways.

pub mod audit;
pub mod config;
pub mod enterprise;
pub mod gateways;
pub mod identity;
pub mod notify;
pub mod store;
pub mod tables;

#[cfg(test)]
mod integration_tests;

pub use audit::{AuditFilter, AuditLogEntry, AuditLogId, AuditLogger};
pub use self::config::{
    AuthSettings, BootstrapSettings, HookSettings, LoggingSettings, ServerSettings, Settings, StoreBackend,
    StoreSettings,
};
pub use enterprise::{Enterprise, EnterpriseSettings};
pub use gateways::{GatewayError, Gateways};
pub use identity::{IdentityError, IdentityService, LoginOutcome};
pub use notify::{
    LoggingNotificationSink, Notification, NotificationDispatcher, NotificationSink, RecordingNotificationSink,
};
pub use store::{InMemoryTableClient, PostgresTableClient, Query, Row, StoreError, Table, TableClient};
pub use tables::Tables;
