//! Audit log: one entry per successful mutation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{EnterpriseId, Entity, Record, text};
use condohub_events::{AuditAction, CommitEvent, HookError, PostCommitHook};

use crate::store::{StoreError, Table, TableClient};

condohub_core::record_id!(
    /// Audit log entry identifier.
    AuditLogId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub enterprise_id: EnterpriseId,
    pub user_email: String,
    pub action: AuditAction,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for AuditLogEntry {
    type Id = AuditLogId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for AuditLogEntry {
    const TABLE: &'static str = "audit_logs";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

/// Post-commit hook appending to the audit table.
///
/// Never retried; a failed append is logged by the hook runner and dropped.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    entries: Table<AuditLogEntry>,
}

impl AuditLogger {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            entries: Table::new(client),
        }
    }

    pub async fn record(
        &self,
        enterprise_id: EnterpriseId,
        user_email: &str,
        action: AuditAction,
        details: &str,
    ) -> Result<AuditLogEntry, StoreError> {
        let entry = AuditLogEntry {
            id: AuditLogId::new(),
            enterprise_id,
            user_email: user_email.to_string(),
            action,
            details: details.to_string(),
            created_at: Utc::now(),
        };
        self.entries.insert(&entry).await?;
        Ok(entry)
    }
}

#[async_trait]
impl PostCommitHook for AuditLogger {
    fn name(&self) -> &'static str {
        "audit"
    }

    async fn on_commit(&self, event: &CommitEvent) -> Result<(), HookError> {
        self.record(event.enterprise_id, &event.actor.email, event.action, &event.details)
            .await
            .map(|_| ())
            .map_err(|e| HookError::Store(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub user_email: Option<String>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if self.action.is_some_and(|a| a != entry.action) {
            return false;
        }
        match self.user_email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => text::contains_ci(&entry.user_email, email),
            None => true,
        }
    }
}

pub fn sort_newest_first(entries: &mut [AuditLogEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTableClient;
    use condohub_core::UserId;
    use condohub_events::ActorRef;

    #[tokio::test]
    async fn hook_appends_one_entry_per_event() {
        let client = Arc::new(InMemoryTableClient::new());
        let logger = AuditLogger::new(client.clone());
        let e = EnterpriseId::new();
        let event = CommitEvent::new(
            e,
            ActorRef {
                user_id: UserId::new(),
                email: "admin@aurora.test".into(),
            },
            AuditAction::CreateTask,
            "Created task 'Fix pump'",
        );

        logger.on_commit(&event).await.unwrap();

        let entries = Table::<AuditLogEntry>::new(client).list(e).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::CreateTask);
        assert_eq!(entries[0].user_email, "admin@aurora.test");
    }

    #[tokio::test]
    async fn store_failure_becomes_hook_error() {
        let client = Arc::new(InMemoryTableClient::with_tables(["tasks"]));
        let logger = AuditLogger::new(client);
        let event = CommitEvent::new(
            EnterpriseId::new(),
            ActorRef {
                user_id: UserId::new(),
                email: "a@b.c".into(),
            },
            AuditAction::DeleteTask,
            "",
        );

        assert!(matches!(logger.on_commit(&event).await, Err(HookError::Store(_))));
    }

    #[test]
    fn filter_by_action_and_email() {
        let entry = AuditLogEntry {
            id: AuditLogId::new(),
            enterprise_id: EnterpriseId::new(),
            user_email: "Staff@Aurora.test".into(),
            action: AuditAction::AddReading,
            details: String::new(),
            created_at: Utc::now(),
        };

        assert!(AuditFilter::default().matches(&entry));
        assert!(
            AuditFilter {
                action: Some(AuditAction::AddReading),
                user_email: Some("staff@".into()),
            }
            .matches(&entry)
        );
        assert!(
            !AuditFilter {
                action: Some(AuditAction::DeleteReading),
                user_email: None,
            }
            .matches(&entry)
        );
    }
}
