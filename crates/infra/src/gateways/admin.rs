//! Admin panel: members, enterprise settings and the audit trail.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use condohub_auth::{
    Action, Actor, Affordances, Membership, MembershipPatch, Module, NewUserAccount, NotificationMap,
    PermissionMap, Role, affordances,
};
use condohub_core::{DomainError, UserId};
use condohub_events::{AuditAction, HookList};

use super::{GatewayResult, commit, gate};
use crate::audit::{AuditFilter, AuditLogEntry, sort_newest_first};
use crate::enterprise::{Enterprise, EnterpriseSettings};
use crate::identity::IdentityService;
use crate::store::{StoreError, Table};
use crate::tables::Tables;

/// A membership joined with its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub membership: Membership,
    pub email: String,
    pub display_name: String,
}

/// Add a user to the enterprise.
///
/// An unknown email creates a new account and requires `password`; a known
/// email only gains a membership.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub permissions: PermissionMap,
    #[serde(default)]
    pub notifications: NotificationMap,
}

#[derive(Debug, Clone)]
pub struct AdminGateway {
    identity: Arc<IdentityService>,
    memberships: Table<Membership>,
    enterprises: Table<Enterprise>,
    audit_logs: Table<AuditLogEntry>,
    hooks: HookList,
}

fn membership_not_found() -> StoreError {
    StoreError::NotFound {
        table: "memberships".to_string(),
    }
}

impl AdminGateway {
    pub fn new(tables: &Tables, identity: Arc<IdentityService>, hooks: HookList) -> Self {
        Self {
            identity,
            memberships: tables.memberships.clone(),
            enterprises: tables.enterprises.clone(),
            audit_logs: tables.audit_logs.clone(),
            hooks,
        }
    }

    async fn member_of(&self, actor: &Actor, user_id: UserId) -> GatewayResult<Membership> {
        self.identity
            .membership(user_id, actor.enterprise_id())
            .await?
            .ok_or_else(|| membership_not_found().into())
    }

    pub async fn list_members(&self, actor: &Actor) -> GatewayResult<Vec<MemberView>> {
        gate(actor, Module::AdminPanel, Action::View, None)?;
        let memberships = self.memberships.list(actor.enterprise_id()).await?;

        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            match self.identity.user(membership.user_id).await {
                Ok(user) => members.push(MemberView {
                    membership,
                    email: user.email,
                    display_name: user.display_name,
                }),
                Err(err) => tracing::warn!(
                    user_id = %membership.user_id,
                    error = %err,
                    "membership without a readable account"
                ),
            }
        }
        members.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(members)
    }

    pub async fn create_member(&self, actor: &Actor, input: NewMember) -> GatewayResult<MemberView> {
        gate(actor, Module::AdminPanel, Action::Create, None)?;
        let enterprise_id = actor.enterprise_id();

        let user = match self.identity.find_user_by_email(&input.email).await? {
            Some(existing) => {
                if self.identity.membership(existing.id, enterprise_id).await?.is_some() {
                    return Err(DomainError::conflict(format!(
                        "{} is already a member of this enterprise",
                        existing.email
                    ))
                    .into());
                }
                existing
            }
            None => {
                let password = input
                    .password
                    .as_deref()
                    .ok_or_else(|| DomainError::validation("password is required for a new account"))?;
                let display_name = input
                    .display_name
                    .clone()
                    .unwrap_or_else(|| input.email.split('@').next().unwrap_or_default().to_string());
                let account = NewUserAccount::new(&input.email, &display_name, password)?;
                self.identity.register_account(account).await?
            }
        };

        let membership = Membership::provision(
            user.id,
            enterprise_id,
            input.role,
            input.permissions,
            input.notifications,
            Utc::now(),
        );
        self.memberships.insert(&membership).await?;
        tracing::info!(
            enterprise_id = %enterprise_id,
            user_id = %user.id,
            role = %membership.role,
            action = %AuditAction::CreateUser,
            "member added"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::CreateUser,
                format!("Added {} as {}", user.email, membership.role),
            ))
            .await;
        Ok(MemberView {
            membership,
            email: user.email,
            display_name: user.display_name,
        })
    }

    pub async fn update_membership(
        &self,
        actor: &Actor,
        user_id: UserId,
        patch: MembershipPatch,
    ) -> GatewayResult<Membership> {
        gate(actor, Module::AdminPanel, Action::Update, None)?;
        let mut membership = self.member_of(actor, user_id).await?;

        membership.apply_patch(patch, Utc::now());
        self.memberships.update(&membership).await?;
        tracing::info!(
            enterprise_id = %membership.enterprise_id,
            user_id = %user_id,
            action = %AuditAction::UpdateMembership,
            "membership updated"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::UpdateMembership,
                format!("Updated permissions of user {user_id}"),
            ))
            .await;
        Ok(membership)
    }

    /// Remove the user from this enterprise only. The account and its other
    /// memberships stay.
    pub async fn delete_membership(&self, actor: &Actor, user_id: UserId) -> GatewayResult<()> {
        gate(actor, Module::AdminPanel, Action::Delete, None)?;
        let membership = self.member_of(actor, user_id).await?;

        self.memberships.delete(*membership.id.as_uuid()).await?;
        tracing::info!(
            enterprise_id = %membership.enterprise_id,
            user_id = %user_id,
            action = %AuditAction::DeleteMembership,
            "membership deleted"
        );

        self.hooks
            .dispatch(commit(
                actor,
                AuditAction::DeleteMembership,
                format!("Removed user {user_id} from the enterprise"),
            ))
            .await;
        Ok(())
    }

    /// Effective UI flags of a member for every module.
    pub async fn member_affordances(&self, actor: &Actor, user_id: UserId) -> GatewayResult<Vec<Affordances>> {
        gate(actor, Module::AdminPanel, Action::View, None)?;
        let membership = self.member_of(actor, user_id).await?;
        Ok(Module::ALL
            .into_iter()
            .map(|m| affordances(&membership, m))
            .collect())
    }

    async fn enterprise(&self, actor: &Actor) -> GatewayResult<Enterprise> {
        let e = actor.enterprise_id();
        Ok(self.enterprises.get(Some(e), *e.as_uuid()).await?)
    }

    pub async fn settings(&self, actor: &Actor) -> GatewayResult<EnterpriseSettings> {
        gate(actor, Module::AdminPanel, Action::View, None)?;
        Ok(self.enterprise(actor).await?.settings)
    }

    pub async fn update_settings(
        &self,
        actor: &Actor,
        settings: EnterpriseSettings,
    ) -> GatewayResult<EnterpriseSettings> {
        gate(actor, Module::AdminPanel, Action::Update, None)?;
        let mut enterprise = self.enterprise(actor).await?;

        enterprise.replace_settings(settings, Utc::now())?;
        self.enterprises.update(&enterprise).await?;
        tracing::info!(
            enterprise_id = %enterprise.id,
            water_limit = ?enterprise.settings.water_limit,
            action = %AuditAction::UpdateSettings,
            "enterprise settings updated"
        );

        let details = match enterprise.settings.water_limit {
            Some(limit) => format!("Water limit set to {limit}"),
            None => "Water limit cleared".to_string(),
        };
        self.hooks
            .dispatch(commit(actor, AuditAction::UpdateSettings, details))
            .await;
        Ok(enterprise.settings)
    }

    pub async fn audit_logs(&self, actor: &Actor, filter: &AuditFilter) -> GatewayResult<Vec<AuditLogEntry>> {
        gate(actor, Module::AdminPanel, Action::View, None)?;
        let mut entries: Vec<AuditLogEntry> = self
            .audit_logs
            .list(actor.enterprise_id())
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}
