use chrono::Utc;

use condohub_auth::{Action, Actor, Membership, Module};
use condohub_core::{DomainError, UserId};
use condohub_events::{AuditAction, HookList, NotificationTrigger};
use condohub_tasks::{NewTask, Task, TaskFilter, TaskId, TaskPatch, sort_tasks};

use super::{GatewayResult, commit, gate};
use crate::store::{Query, Table};
use crate::tables::Tables;

#[derive(Debug, Clone)]
pub struct TaskGateway {
    tasks: Table<Task>,
    memberships: Table<Membership>,
    hooks: HookList,
}

impl TaskGateway {
    pub fn new(tables: &Tables, hooks: HookList) -> Self {
        Self {
            tasks: tables.tasks.clone(),
            memberships: tables.memberships.clone(),
            hooks,
        }
    }

    pub async fn list(&self, actor: &Actor, filter: &TaskFilter) -> GatewayResult<Vec<Task>> {
        gate(actor, Module::Tasks, Action::View, None)?;
        let mut tasks: Vec<Task> = self
            .tasks
            .list(actor.enterprise_id())
            .await?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    pub async fn get(&self, actor: &Actor, id: TaskId) -> GatewayResult<Task> {
        gate(actor, Module::Tasks, Action::View, None)?;
        Ok(self.tasks.get(Some(actor.enterprise_id()), *id.as_uuid()).await?)
    }

    async fn ensure_member(&self, actor: &Actor, user_id: Option<UserId>) -> GatewayResult<()> {
        let Some(user_id) = user_id else {
            return Ok(());
        };
        let found = self
            .memberships
            .find(&Query::scoped(actor.enterprise_id()).eq("userId", user_id.to_string()))
            .await?;
        if found.is_empty() {
            return Err(DomainError::validation(format!("assignee {user_id} is not a member of this enterprise")).into());
        }
        Ok(())
    }

    pub async fn create(&self, actor: &Actor, input: NewTask) -> GatewayResult<Task> {
        gate(actor, Module::Tasks, Action::Create, None)?;
        let task = Task::create(actor.enterprise_id(), actor.user_id(), input, Utc::now())?;
        self.ensure_member(actor, task.assignee).await?;

        self.tasks.insert(&task).await?;
        tracing::info!(
            enterprise_id = %task.enterprise_id,
            task_id = %task.id,
            action = %AuditAction::CreateTask,
            "task created"
        );

        let mut event = commit(actor, AuditAction::CreateTask, format!("Created task '{}'", task.title));
        if let Some(assignee) = task.wants_assignee_notification() {
            event = event.with_trigger(NotificationTrigger::TaskAssigned {
                task_id: *task.id.as_uuid(),
                title: task.title.clone(),
                assignee,
                updated: false,
            });
        }
        self.hooks.dispatch(event).await;
        Ok(task)
    }

    /// READ_WRITE holders may only update tasks assigned to them.
    pub async fn update(&self, actor: &Actor, id: TaskId, patch: TaskPatch) -> GatewayResult<Task> {
        let mut task = self.get(actor, id).await?;
        gate(actor, Module::Tasks, Action::Update, task.owner())?;

        task.apply_patch(patch, Utc::now())?;
        self.ensure_member(actor, task.assignee).await?;

        self.tasks.update(&task).await?;
        tracing::info!(
            enterprise_id = %task.enterprise_id,
            task_id = %task.id,
            action = %AuditAction::UpdateTask,
            "task updated"
        );

        let mut event = commit(actor, AuditAction::UpdateTask, format!("Updated task '{}'", task.title));
        if let Some(assignee) = task.wants_assignee_notification() {
            event = event.with_trigger(NotificationTrigger::TaskAssigned {
                task_id: *task.id.as_uuid(),
                title: task.title.clone(),
                assignee,
                updated: true,
            });
        }
        self.hooks.dispatch(event).await;
        Ok(task)
    }

    pub async fn delete(&self, actor: &Actor, id: TaskId) -> GatewayResult<()> {
        let task = self.get(actor, id).await?;
        gate(actor, Module::Tasks, Action::Delete, task.owner())?;

        self.tasks.delete(*task.id.as_uuid()).await?;
        tracing::info!(
            enterprise_id = %task.enterprise_id,
            task_id = %task.id,
            action = %AuditAction::DeleteTask,
            "task deleted"
        );

        self.hooks
            .dispatch(commit(actor, AuditAction::DeleteTask, format!("Deleted task '{}'", task.title)))
            .await;
        Ok(())
    }
}
