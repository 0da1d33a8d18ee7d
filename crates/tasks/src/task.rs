use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainResult, EnterpriseId, Entity, Record, UserId, text};

condohub_core::record_id!(
    /// Task identifier (enterprise-scoped via `enterprise_id` on the record).
    TaskId
);

/// Task status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A maintenance task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub enterprise_id: EnterpriseId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<UserId>,
    pub created_by: UserId,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notify_assignee: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee: Option<UserId>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notify_assignee: bool,
}

/// Partial update of a task. `null` clears optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub assignee: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub due_date: Option<Option<NaiveDate>>,
    pub notify_assignee: Option<bool>,
}

impl Task {
    pub fn create(
        enterprise_id: EnterpriseId,
        created_by: UserId,
        input: NewTask,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = text::required("title", &input.title)?;
        let status = input.status.unwrap_or_default();

        Ok(Self {
            id: TaskId::new(),
            enterprise_id,
            title,
            description: text::optional(input.description),
            status,
            priority: input.priority.unwrap_or_default(),
            assignee: input.assignee,
            created_by,
            due_date: input.due_date,
            notify_assignee: input.notify_assignee,
            completed_at: (status == TaskStatus::Completed).then_some(now),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch. Validation happens before any field changes.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let title = patch
            .title
            .as_deref()
            .map(|t| text::required("title", t))
            .transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = text::optional(description);
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(notify) = patch.notify_assignee {
            self.notify_assignee = notify;
        }
        self.updated_at = now;
        Ok(())
    }

    fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        if status == self.status {
            return;
        }
        self.completed_at = (status == TaskStatus::Completed).then_some(now);
        self.status = status;
    }

    /// The owner for the ownership rule: the assignee.
    pub fn owner(&self) -> Option<UserId> {
        self.assignee
    }

    /// Whether the assignee should be told about this task.
    pub fn wants_assignee_notification(&self) -> Option<UserId> {
        if self.notify_assignee { self.assignee } else { None }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|d| d < today)
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Task {
    const TABLE: &'static str = "tasks";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

/// List filter (all fields optional, combined with AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<UserId>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        if self.assignee.is_some() && self.assignee != task.assignee {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                text::contains_ci(&task.title, q)
                    || task.description.as_deref().is_some_and(|d| text::contains_ci(d, q))
            }
            _ => true,
        }
    }
}

/// Sort by due date (undated last), then by creation time.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        let due = match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => core::cmp::Ordering::Less,
            (None, Some(_)) => core::cmp::Ordering::Greater,
            (None, None) => core::cmp::Ordering::Equal,
        };
        due.then_with(|| a.created_at.cmp(&b.created_at))
    });
}
