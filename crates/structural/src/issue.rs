use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainResult, EnterpriseId, Entity, Record, UserId, text};

condohub_core::record_id!(
    /// Structural issue identifier.
    IssueId
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    pub const fn as_str(self) -> &'static str {
        match self {
            IssueSeverity::Low => "LOW",
            IssueSeverity::Medium => "MEDIUM",
            IssueSeverity::High => "HIGH",
            IssueSeverity::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    #[default]
    Reported,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralIssue {
    pub id: IssueId,
    pub enterprise_id: EnterpriseId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub reported_by: UserId,
    #[serde(default)]
    pub notify_admin: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub severity: Option<IssueSeverity>,
    #[serde(default)]
    pub notify_admin: bool,
    /// Photo URLs stored after the issue itself.
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub location: Option<Option<String>>,
    pub severity: Option<IssueSeverity>,
    pub status: Option<IssueStatus>,
    pub notify_admin: Option<bool>,
}

impl StructuralIssue {
    /// Build an issue. Photo URLs in `input` are not part of the record; the
    /// caller stores them separately.
    pub fn create(
        enterprise_id: EnterpriseId,
        reported_by: UserId,
        input: &NewIssue,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: IssueId::new(),
            enterprise_id,
            title: text::required("title", &input.title)?,
            description: text::optional(input.description.clone()),
            location: text::optional(input.location.clone()),
            severity: input.severity.unwrap_or_default(),
            status: IssueStatus::Reported,
            reported_by,
            notify_admin: input.notify_admin,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: IssuePatch, now: DateTime<Utc>) -> DomainResult<()> {
        let title = patch.title.as_deref().map(|t| text::required("title", t)).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(v) = patch.description {
            self.description = text::optional(v);
        }
        if let Some(v) = patch.location {
            self.location = text::optional(v);
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(status) = patch.status.filter(|s| *s != self.status) {
            self.resolved_at = (status == IssueStatus::Resolved).then_some(now);
            self.status = status;
        }
        if let Some(notify) = patch.notify_admin {
            self.notify_admin = notify;
        }
        self.updated_at = now;
        Ok(())
    }

    /// The owner for the ownership rule: the reporter.
    pub fn owner(&self) -> UserId {
        self.reported_by
    }
}

impl Entity for StructuralIssue {
    type Id = IssueId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for StructuralIssue {
    const TABLE: &'static str = "structural_issues";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub severity: Option<IssueSeverity>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &StructuralIssue) -> bool {
        self.status.is_none_or(|s| s == issue.status) && self.severity.is_none_or(|s| s == issue.severity)
    }
}

pub fn sort_newest_first(issues: &mut [StructuralIssue]) {
    issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
