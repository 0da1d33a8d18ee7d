//! Per-module CRUD gateways.
//!
//! Every operation follows the same pipeline:
//!
//! ```text
//! authorize  (permission evaluator; owner read first for owner-scoped updates)
//!   ↓
//! validate   (domain constructors / patches; no store write on failure)
//!   ↓
//! store      (one or more independent table calls, no transaction)
//!   ↓
//! hooks      (audit + notifications, best-effort)
//! ```

pub mod admin;
pub mod documents;
pub mod equipment;
pub mod structural;
pub mod suppliers;
pub mod tasks;
pub mod water;

use std::sync::Arc;

use thiserror::Error;

use condohub_auth::{Action, Actor, AuthzError, Module, PasswordError, authorize};
use condohub_core::{DomainError, UserId};
use condohub_events::{ActorRef, AuditAction, CommitEvent, HookList};

use crate::identity::{IdentityError, IdentityService};
use crate::store::StoreError;
use crate::tables::Tables;

pub use admin::AdminGateway;
pub use documents::DocumentGateway;
pub use equipment::EquipmentGateway;
pub use structural::StructuralGateway;
pub use suppliers::SupplierGateway;
pub use tasks::TaskGateway;
pub use water::WaterGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<IdentityError> for GatewayError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Domain(e) => Self::Domain(e),
            IdentityError::Password(e) => Self::Password(e),
            IdentityError::Store(e) => Self::Store(e),
            other => Self::Domain(DomainError::validation(other.to_string())),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gate an action in the actor's own enterprise.
pub(crate) fn gate(actor: &Actor, module: Module, action: Action, owner: Option<UserId>) -> GatewayResult<()> {
    authorize(actor, actor.enterprise_id(), module, action, owner).map_err(|err| {
        tracing::warn!(
            enterprise_id = %actor.enterprise_id(),
            user_id = %actor.user_id(),
            module = %module,
            action = %action,
            error = %err,
            "authorization denied"
        );
        GatewayError::Forbidden(err)
    })
}

pub(crate) fn actor_ref(actor: &Actor) -> ActorRef {
    ActorRef {
        user_id: actor.user_id(),
        email: actor.email().to_string(),
    }
}

pub(crate) fn commit(actor: &Actor, action: AuditAction, details: impl Into<String>) -> CommitEvent {
    CommitEvent::new(actor.enterprise_id(), actor_ref(actor), action, details)
}

/// Every gateway, sharing one hook list.
#[derive(Debug, Clone)]
pub struct Gateways {
    pub tasks: TaskGateway,
    pub water: WaterGateway,
    pub equipment: EquipmentGateway,
    pub structural: StructuralGateway,
    pub documents: DocumentGateway,
    pub suppliers: SupplierGateway,
    pub admin: AdminGateway,
}

impl Gateways {
    pub fn new(tables: &Tables, identity: Arc<IdentityService>, hooks: HookList) -> Self {
        Self {
            tasks: TaskGateway::new(tables, hooks.clone()),
            water: WaterGateway::new(tables, hooks.clone()),
            equipment: EquipmentGateway::new(tables, hooks.clone()),
            structural: StructuralGateway::new(tables, hooks.clone()),
            documents: DocumentGateway::new(tables, hooks.clone()),
            suppliers: SupplierGateway::new(tables, hooks.clone()),
            admin: AdminGateway::new(tables, identity, hooks),
        }
    }
}
