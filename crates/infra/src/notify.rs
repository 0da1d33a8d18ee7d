//! Notification dispatch.
//!
//! Notifications are computed from commit triggers and membership opt-ins, then
//! handed to a [`NotificationSink`]. No email is ever sent: the production sink
//! only logs what would have been delivered.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;

use condohub_auth::{Membership, Module, Role, UserAccount, should_notify};
use condohub_core::{EnterpriseId, UserId};
use condohub_events::{CommitEvent, HookError, NotificationTrigger, PostCommitHook};
use condohub_water::exceeds_limit;

use crate::store::{Query, StoreError, Table, TableClient};

/// One message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub enterprise_id: EnterpriseId,
    pub recipient: UserId,
    pub email: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), HookError>;
}

/// Logs each notification at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationSink;

#[async_trait]
impl NotificationSink for LoggingNotificationSink {
    async fn deliver(&self, n: &Notification) -> Result<(), HookError> {
        tracing::info!(
            enterprise_id = %n.enterprise_id,
            recipient = %n.email,
            subject = %n.subject,
            "notification (not sent)"
        );
        Ok(())
    }
}

/// Keeps every delivered notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn deliver(&self, n: &Notification) -> Result<(), HookError> {
        self.sent
            .lock()
            .map_err(|_| HookError::Delivery("recording sink lock poisoned".to_string()))?
            .push(n.clone());
        Ok(())
    }
}

/// Post-commit hook turning [`NotificationTrigger`]s into notifications.
///
/// Recipients:
/// - task assignment: the assignee, if opted into `tasks`
/// - high consumption: every member opted into `water`
/// - structural issue: every ADMIN member opted into `structural`
pub struct NotificationDispatcher {
    memberships: Table<Membership>,
    users: Table<UserAccount>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(client: Arc<dyn TableClient>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            memberships: Table::new(client.clone()),
            users: Table::new(client),
            sink,
        }
    }

    async fn recipients(
        &self,
        enterprise_id: EnterpriseId,
        trigger: &NotificationTrigger,
    ) -> Result<Vec<Membership>, StoreError> {
        let members = self.memberships.list(enterprise_id).await?;
        let selected = match trigger {
            NotificationTrigger::TaskAssigned { assignee, .. } => members
                .into_iter()
                .filter(|m| m.user_id == *assignee && should_notify(Module::Tasks, m))
                .collect(),
            NotificationTrigger::HighConsumption { .. } => members
                .into_iter()
                .filter(|m| should_notify(Module::Water, m))
                .collect(),
            NotificationTrigger::StructuralIssueReported { .. } => members
                .into_iter()
                .filter(|m| m.role == Role::Admin && should_notify(Module::Structural, m))
                .collect(),
        };
        Ok(selected)
    }

    async fn email_of(&self, user_id: UserId) -> Result<Option<String>, StoreError> {
        let found = self
            .users
            .find(&Query::all().key(*user_id.as_uuid()))
            .await?;
        Ok(found.into_iter().next().map(|u| u.email))
    }
}

/// Subject and body, or `None` when the trigger does not fire.
fn compose(trigger: &NotificationTrigger) -> Option<(String, String)> {
    match trigger {
        NotificationTrigger::TaskAssigned { title, updated, .. } => {
            let subject = if *updated {
                format!("Task updated: {title}")
            } else {
                format!("New task: {title}")
            };
            Some((subject, format!("You are assigned to the task \"{title}\".")))
        }
        NotificationTrigger::HighConsumption {
            unit,
            consumption,
            limit,
            ..
        } => exceeds_limit(*consumption, Some(*limit)).then(|| {
            (
                format!("High water consumption in unit {unit}"),
                format!("Unit {unit} consumed {consumption} (limit {limit})."),
            )
        }),
        NotificationTrigger::StructuralIssueReported { title, severity, .. } => Some((
            format!("Structural issue reported: {title}"),
            format!("A {severity} severity structural issue was reported: \"{title}\"."),
        )),
    }
}

#[async_trait]
impl PostCommitHook for NotificationDispatcher {
    fn name(&self) -> &'static str {
        "notifications"
    }

    async fn on_commit(&self, event: &CommitEvent) -> Result<(), HookError> {
        let Some(trigger) = &event.trigger else {
            return Ok(());
        };
        let Some((subject, body)) = compose(trigger) else {
            return Ok(());
        };

        let recipients = self
            .recipients(event.enterprise_id, trigger)
            .await
            .map_err(|e| HookError::Store(e.to_string()))?;

        let mut failure = None;
        for member in recipients {
            let email = match self.email_of(member.user_id).await {
                Ok(Some(email)) => email,
                Ok(None) => {
                    tracing::warn!(user_id = %member.user_id, "notification recipient has no account");
                    continue;
                }
                Err(e) => {
                    failure = Some(HookError::Store(e.to_string()));
                    continue;
                }
            };
            let notification = Notification {
                enterprise_id: event.enterprise_id,
                recipient: member.user_id,
                email,
                subject: subject.clone(),
                body: body.clone(),
            };
            if let Err(e) = self.sink.deliver(&notification).await {
                failure = Some(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
