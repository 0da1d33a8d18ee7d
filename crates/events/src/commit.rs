use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use condohub_core::{EnterpriseId, UserId};

/// Who performed a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    pub user_id: UserId,
    pub email: String,
}

/// Enumerated audit action identifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateTask,
    UpdateTask,
    DeleteTask,

    AddReading,
    UpdateReading,
    DeleteReading,

    CreateEquipment,
    UpdateEquipment,
    DeleteEquipment,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    AddMaintenance,
    DeleteMaintenance,

    ReportIssue,
    UpdateIssue,
    DeleteIssue,
    AddIssuePhoto,

    UploadDocument,
    UpdateDocument,
    DeleteDocument,

    CreateSupplier,
    UpdateSupplier,
    DeleteSupplier,

    CreateUser,
    UpdateMembership,
    DeleteMembership,
    UpdateSettings,
}

impl AuditAction {
    pub const ALL: [AuditAction; 28] = [
        AuditAction::CreateTask,
        AuditAction::UpdateTask,
        AuditAction::DeleteTask,
        AuditAction::AddReading,
        AuditAction::UpdateReading,
        AuditAction::DeleteReading,
        AuditAction::CreateEquipment,
        AuditAction::UpdateEquipment,
        AuditAction::DeleteEquipment,
        AuditAction::CreateCategory,
        AuditAction::UpdateCategory,
        AuditAction::DeleteCategory,
        AuditAction::AddMaintenance,
        AuditAction::DeleteMaintenance,
        AuditAction::ReportIssue,
        AuditAction::UpdateIssue,
        AuditAction::DeleteIssue,
        AuditAction::AddIssuePhoto,
        AuditAction::UploadDocument,
        AuditAction::UpdateDocument,
        AuditAction::DeleteDocument,
        AuditAction::CreateSupplier,
        AuditAction::UpdateSupplier,
        AuditAction::DeleteSupplier,
        AuditAction::CreateUser,
        AuditAction::UpdateMembership,
        AuditAction::DeleteMembership,
        AuditAction::UpdateSettings,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AuditAction::CreateTask => "CREATE_TASK",
            AuditAction::UpdateTask => "UPDATE_TASK",
            AuditAction::DeleteTask => "DELETE_TASK",
            AuditAction::AddReading => "ADD_READING",
            AuditAction::UpdateReading => "UPDATE_READING",
            AuditAction::DeleteReading => "DELETE_READING",
            AuditAction::CreateEquipment => "CREATE_EQUIPMENT",
            AuditAction::UpdateEquipment => "UPDATE_EQUIPMENT",
            AuditAction::DeleteEquipment => "DELETE_EQUIPMENT",
            AuditAction::CreateCategory => "CREATE_CATEGORY",
            AuditAction::UpdateCategory => "UPDATE_CATEGORY",
            AuditAction::DeleteCategory => "DELETE_CATEGORY",
            AuditAction::AddMaintenance => "ADD_MAINTENANCE",
            AuditAction::DeleteMaintenance => "DELETE_MAINTENANCE",
            AuditAction::ReportIssue => "REPORT_ISSUE",
            AuditAction::UpdateIssue => "UPDATE_ISSUE",
            AuditAction::DeleteIssue => "DELETE_ISSUE",
            AuditAction::AddIssuePhoto => "ADD_ISSUE_PHOTO",
            AuditAction::UploadDocument => "UPLOAD_DOCUMENT",
            AuditAction::UpdateDocument => "UPDATE_DOCUMENT",
            AuditAction::DeleteDocument => "DELETE_DOCUMENT",
            AuditAction::CreateSupplier => "CREATE_SUPPLIER",
            AuditAction::UpdateSupplier => "UPDATE_SUPPLIER",
            AuditAction::DeleteSupplier => "DELETE_SUPPLIER",
            AuditAction::CreateUser => "CREATE_USER",
            AuditAction::UpdateMembership => "UPDATE_MEMBERSHIP",
            AuditAction::DeleteMembership => "DELETE_MEMBERSHIP",
            AuditAction::UpdateSettings => "UPDATE_SETTINGS",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown audit action '{s}'"))
    }
}

/// What a notification hook should look at after a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationTrigger {
    /// A task was created or updated with "notify assignee" set.
    TaskAssigned {
        task_id: Uuid,
        title: String,
        assignee: UserId,
        updated: bool,
    },

    /// A water reading was inserted; the hook compares against the limit.
    HighConsumption {
        reading_id: Uuid,
        unit: String,
        consumption: f64,
        limit: f64,
    },

    /// A structural issue was reported with "notify admin" set.
    StructuralIssueReported {
        issue_id: Uuid,
        title: String,
        severity: String,
    },
}

/// One successful mutation, as seen by post-commit hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitEvent {
    pub enterprise_id: EnterpriseId,
    pub actor: ActorRef,
    pub action: AuditAction,
    pub details: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<NotificationTrigger>,
}

impl CommitEvent {
    pub fn new(enterprise_id: EnterpriseId, actor: ActorRef, action: AuditAction, details: impl Into<String>) -> Self {
        Self {
            enterprise_id,
            actor,
            action,
            details: details.into(),
            occurred_at: Utc::now(),
            trigger: None,
        }
    }

    pub fn with_trigger(mut self, trigger: NotificationTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
}
