use chrono::Utc;
use serde::Serialize;

use condohub_auth::{Action, Actor, Module};
use condohub_events::{AuditAction, HookList, NotificationTrigger};
use condohub_structural::{
    IssueFilter, IssueId, IssuePatch, IssuePhoto, NewIssue, StructuralIssue, sort_newest_first,
};

use super::{GatewayResult, commit, gate};
use crate::store::{Query, Table};
use crate::tables::Tables;

/// An issue with its photos.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: StructuralIssue,
    pub photos: Vec<IssuePhoto>,
}

#[derive(Debug, Clone)]
pub struct StructuralGateway {
    issues: Table<StructuralIssue>,
    photos: Table<IssuePhoto>,
    hooks: HookList,
}

impl StructuralGateway {
    pub fn new(tables: &Tables, hooks: HookList) -> Self {
        Self {
            issues: tables.issues.clone(),
            photos: tables.photos.clone(),
            hooks,
        }
    }

    pub async fn list(&self, actor: &Actor, filter: &IssueFilter) -> GatewayResult<Vec<StructuralIssue>> {
        gate(actor, Module::Structural, Action::View, None)?;
        let mut issues: Vec<StructuralIssue> = self
            .issues
            .list(actor.enterprise_id())
            .await?
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect();
        sort_newest_first(&mut issues);
        Ok(issues)
    }

    async fn load(&self, actor: &Actor, id: IssueId) -> GatewayResult<StructuralIssue> {
        gate(actor, Module::Structural, Action::View, None)?;
        Ok(self.issues.get(Some(actor.enterprise_id()), *id.as_uuid()).await?)
    }

    async fn photos_of(&self, actor: &Actor, id: IssueId) -> GatewayResult<Vec<IssuePhoto>> {
        let mut photos = self
            .photos
            .find(&Query::scoped(actor.enterprise_id()).eq("issueId", id.to_string()))
            .await?;
        photos.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
        Ok(photos)
    }

    pub async fn get(&self, actor: &Actor, id: IssueId) -> GatewayResult<IssueDetail> {
        let issue = self.load(actor, id).await?;
        let photos = self.photos_of(actor, id).await?;
        Ok(IssueDetail { issue, photos })
    }

    /// Report an issue. Photos are inserted one by one after the issue; a
    /// photo that fails to store is logged and skipped.
    pub async fn create(&self, actor: &Actor, input: NewIssue) -> GatewayResult<IssueDetail> {
        gate(actor, Module::Structural, Action::Create, None)?;
        let now = Utc::now();
        let issue = StructuralIssue::create(actor.enterprise_id(), actor.user_id(), &input, now)?;
        let pending = input
            .photos
            .iter()
            .map(|url| IssuePhoto::new(actor.enterprise_id(), issue.id, url, now))
            .collect::<Result<Vec<_>, _>>()?;

        self.issues.insert(&issue).await?;

        let mut photos = Vec::with_capacity(pending.len());
        for photo in pending {
            match self.photos.insert(&photo).await {
                Ok(()) => photos.push(photo),
                Err(err) => tracing::warn!(
                    issue_id = %issue.id,
                    url = %photo.url,
                    error = %err,
                    "issue photo not stored"
                ),
            }
        }
        tracing::info!(
            enterprise_id = %issue.enterprise_id,
            issue_id = %issue.id,
            photos = photos.len(),
            action = %AuditAction::ReportIssue,
            "structural issue reported"
        );

        let mut event = commit(
            actor,
            AuditAction::ReportIssue,
            format!("Reported issue '{}' ({})", issue.title, issue.severity.as_str()),
        );
        if issue.notify_admin {
            event = event.with_trigger(NotificationTrigger::StructuralIssueReported {
                issue_id: *issue.id.as_uuid(),
                title: issue.title.clone(),
                severity: issue.severity.as_str().to_string(),
            });
        }
        self.hooks.dispatch(event).await;
        Ok(IssueDetail { issue, photos })
    }

    /// READ_WRITE holders may only update issues they reported.
    pub async fn update(&self, actor: &Actor, id: IssueId, patch: IssuePatch) -> GatewayResult<StructuralIssue> {
        let mut issue = self.load(actor, id).await?;
        gate(actor, Module::Structural, Action::Update, Some(issue.owner()))?;

        issue.apply_patch(patch, Utc::now())?;
        self.issues.update(&issue).await?;
        tracing::info!(
            enterprise_id = %issue.enterprise_id,
            issue_id = %issue.id,
            action = %AuditAction::UpdateIssue,
            "structural issue updated"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UpdateIssue,
                format!("Updated issue '{}'", issue.title),
            ))
            .await;
        Ok(issue)
    }

    pub async fn delete(&self, actor: &Actor, id: IssueId) -> GatewayResult<()> {
        let issue = self.load(actor, id).await?;
        gate(actor, Module::Structural, Action::Delete, Some(issue.owner()))?;

        self.issues.delete(*issue.id.as_uuid()).await?;
        let photos = self.photos_of(actor, id).await.unwrap_or_else(|err| {
            tracing::warn!(issue_id = %id, error = %err, "could not list issue photos");
            Vec::new()
        });
        for photo in &photos {
            if let Err(err) = self.photos.delete(*photo.id.as_uuid()).await {
                tracing::warn!(issue_id = %issue.id, photo_id = %photo.id, error = %err, "issue photo left behind");
            }
        }
        tracing::info!(
            enterprise_id = %issue.enterprise_id,
            issue_id = %issue.id,
            action = %AuditAction::DeleteIssue,
            "structural issue deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteIssue,
                format!("Deleted issue '{}'", issue.title),
            ))
            .await;
        Ok(())
    }

    /// Attach one more photo. Same ownership rule as editing the issue.
    pub async fn add_photo(&self, actor: &Actor, id: IssueId, url: &str) -> GatewayResult<IssuePhoto> {
        let issue = self.load(actor, id).await?;
        gate(actor, Module::Structural, Action::Update, Some(issue.owner()))?;
        let photo = IssuePhoto::new(actor.enterprise_id(), issue.id, url, Utc::now())?;

        self.photos.insert(&photo).await?;
        tracing::info!(
            enterprise_id = %issue.enterprise_id,
            issue_id = %issue.id,
            photo_id = %photo.id,
            action = %AuditAction::AddIssuePhoto,
            "issue photo added"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::AddIssuePhoto,
                format!("Added photo to issue '{}'", issue.title),
            ))
            .await;
        Ok(photo)
    }
}
