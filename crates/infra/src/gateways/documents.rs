use chrono::Utc;

use condohub_auth::{Action, Actor, Module};
use condohub_documents::{
    Document, DocumentFilter, DocumentId, DocumentPatch, NewDocument, expiring_within, sort_newest_first,
};
use condohub_events::{AuditAction, HookList};

use super::{GatewayResult, commit, gate};
use crate::store::Table;
use crate::tables::Tables;

#[derive(Debug, Clone)]
pub struct DocumentGateway {
    documents: Table<Document>,
    hooks: HookList,
}

impl DocumentGateway {
    pub fn new(tables: &Tables, hooks: HookList) -> Self {
        Self {
            documents: tables.documents.clone(),
            hooks,
        }
    }

    pub async fn list(&self, actor: &Actor, filter: &DocumentFilter) -> GatewayResult<Vec<Document>> {
        gate(actor, Module::Documents, Action::View, None)?;
        let mut docs: Vec<Document> = self
            .documents
            .list(actor.enterprise_id())
            .await?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect();
        sort_newest_first(&mut docs);
        Ok(docs)
    }

    /// Documents expiring within `days`, already expired ones included, soonest first.
    pub async fn expiring(&self, actor: &Actor, days: u32) -> GatewayResult<Vec<Document>> {
        gate(actor, Module::Documents, Action::View, None)?;
        let docs = self.documents.list(actor.enterprise_id()).await?;
        Ok(expiring_within(&docs, Utc::now().date_naive(), days)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn get(&self, actor: &Actor, id: DocumentId) -> GatewayResult<Document> {
        gate(actor, Module::Documents, Action::View, None)?;
        Ok(self
            .documents
            .get(Some(actor.enterprise_id()), *id.as_uuid())
            .await?)
    }

    pub async fn create(&self, actor: &Actor, input: NewDocument) -> GatewayResult<Document> {
        gate(actor, Module::Documents, Action::Create, None)?;
        let doc = Document::create(actor.enterprise_id(), actor.user_id(), input, Utc::now())?;

        self.documents.insert(&doc).await?;
        tracing::info!(
            enterprise_id = %doc.enterprise_id,
            document_id = %doc.id,
            action = %AuditAction::UploadDocument,
            "document added"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UploadDocument,
                format!("Uploaded document '{}' ({})", doc.title, doc.file_name),
            ))
            .await;
        Ok(doc)
    }

    pub async fn update(&self, actor: &Actor, id: DocumentId, patch: DocumentPatch) -> GatewayResult<Document> {
        let mut doc = self.get(actor, id).await?;
        gate(actor, Module::Documents, Action::Update, None)?;

        doc.apply_patch(patch, Utc::now())?;
        self.documents.update(&doc).await?;
        tracing::info!(
            enterprise_id = %doc.enterprise_id,
            document_id = %doc.id,
            action = %AuditAction::UpdateDocument,
            "document updated"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UpdateDocument,
                format!("Updated document '{}'", doc.title),
            ))
            .await;
        Ok(doc)
    }

    pub async fn delete(&self, actor: &Actor, id: DocumentId) -> GatewayResult<()> {
        let doc = self.get(actor, id).await?;
        gate(actor, Module::Documents, Action::Delete, None)?;

        self.documents.delete(*doc.id.as_uuid()).await?;
        tracing::info!(
            enterprise_id = %doc.enterprise_id,
            document_id = %doc.id,
            action = %AuditAction::DeleteDocument,
            "document deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteDocument,
                format!("Deleted document '{}'", doc.title),
            ))
            .await;
        Ok(())
    }
}
