//! The permission evaluator.
//!
//! Every gateway mutation and every UI affordance goes through the functions in
//! this module. Decisions depend only on the membership's permission map and,
//! for owner-scoped modules, on the record's owner.
//!
//! - No IO
//! - No panics

use serde::Serialize;
use thiserror::Error;

use condohub_core::{EnterpriseId, UserId};

use crate::{Membership, Module, PermissionLevel};

/// An authenticated user acting within one of their memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    email: String,
    membership: Membership,
}

impl Actor {
    /// Bind a user to the membership they are acting through.
    pub fn new(user_id: UserId, email: impl Into<String>, membership: Membership) -> Result<Self, AuthzError> {
        if membership.user_id != user_id {
            return Err(AuthzError::MembershipMismatch);
        }
        Ok(Self {
            user_id,
            email: email.into(),
            membership,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn enterprise_id(&self) -> EnterpriseId {
        self.membership.enterprise_id
    }
}

/// What the actor wants to do in a module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    ManageCategories,
}

impl Action {
    /// Minimum level for the action, before any ownership rule.
    pub const fn required_level(self) -> PermissionLevel {
        match self {
            Action::View => PermissionLevel::ReadOnly,
            Action::Create | Action::Update => PermissionLevel::ReadWrite,
            Action::Delete | Action::ManageCategories => PermissionLevel::FullAccess,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ManageCategories => "manage_categories",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("membership does not belong to the acting user")]
    MembershipMismatch,

    #[error("forbidden: module '{0}' is not available")]
    ModuleHidden(Module),

    #[error("forbidden: {action} on '{module}' requires {required}, granted {granted}")]
    InsufficientLevel {
        module: Module,
        action: Action,
        required: PermissionLevel,
        granted: PermissionLevel,
    },

    #[error("forbidden: this '{module}' record belongs to another user")]
    NotOwner { module: Module },
}

/// Resolve the membership's level for a module.
///
/// Absent keys resolve to [`PermissionLevel::None`].
pub fn resolve(membership: &Membership, module: Module) -> PermissionLevel {
    membership
        .permissions
        .get(module)
        .unwrap_or(PermissionLevel::None)
}

/// Authorize an action on a record of `enterprise_id` in `module`.
///
/// `owner` is the record's assignee/reporter; it only matters for updates in
/// owner-scoped modules, where a READ_WRITE holder must be the owner and a
/// FULL_ACCESS holder is never restricted.
pub fn authorize(
    actor: &Actor,
    enterprise_id: EnterpriseId,
    module: Module,
    action: Action,
    owner: Option<UserId>,
) -> Result<(), AuthzError> {
    if actor.enterprise_id() != enterprise_id {
        return Err(AuthzError::TenantMismatch);
    }

    let granted = resolve(actor.membership(), module);
    if granted == PermissionLevel::None {
        return Err(AuthzError::ModuleHidden(module));
    }

    let required = action.required_level();
    if !granted.satisfies(required) {
        return Err(AuthzError::InsufficientLevel {
            module,
            action,
            required,
            granted,
        });
    }

    if action == Action::Update
        && module.is_owner_scoped()
        && granted != PermissionLevel::FullAccess
        && owner != Some(actor.user_id())
    {
        return Err(AuthzError::NotOwner { module });
    }

    Ok(())
}

/// UI gating flags for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordances {
    pub module: Module,
    pub level: PermissionLevel,
    pub visible: bool,
    pub can_create: bool,
    pub can_edit_own: bool,
    pub can_edit_any: bool,
    pub can_delete: bool,
    pub can_manage_categories: bool,
}

/// Derive navigation/create/edit/delete affordances from a membership.
pub fn affordances(membership: &Membership, module: Module) -> Affordances {
    let level = resolve(membership, module);
    let full = level == PermissionLevel::FullAccess;
    let write = level.satisfies(PermissionLevel::ReadWrite);

    Affordances {
        module,
        level,
        visible: level != PermissionLevel::None,
        can_create: write,
        can_edit_own: write,
        can_edit_any: full || (write && !module.is_owner_scoped()),
        can_delete: full,
        can_manage_categories: full,
    }
}
