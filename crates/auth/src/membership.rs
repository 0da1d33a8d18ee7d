use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{EnterpriseId, Entity, Record, UserId};

use crate::{ModuleMap, PermissionLevel, Role};

condohub_core::record_id!(
    /// Identifier of a membership row.
    MembershipId
);

pub type PermissionMap = ModuleMap<PermissionLevel>;
pub type NotificationMap = ModuleMap<bool>;

/// Binding of one user to one enterprise.
///
/// This is the authorization boundary object: it states which enterprise the
/// user acts within, the per-module permission levels granted there, and the
/// per-module notification opt-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub enterprise_id: EnterpriseId,
    pub role: Role,
    #[serde(default)]
    pub permissions: PermissionMap,
    #[serde(default)]
    pub notifications: NotificationMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a membership, applied by the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPatch {
    pub role: Option<Role>,
    pub permissions: Option<PermissionMap>,
    pub notifications: Option<NotificationMap>,
}

impl Membership {
    /// Create a membership at account-provisioning time.
    ///
    /// The role's provisioning rule decides the initial permission map (see
    /// [`Role::provisioned_permissions`]).
    pub fn provision(
        user_id: UserId,
        enterprise_id: EnterpriseId,
        role: Role,
        requested: PermissionMap,
        notifications: NotificationMap,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MembershipId::new(),
            user_id,
            enterprise_id,
            role,
            permissions: role.provisioned_permissions(requested),
            notifications,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an admin edit. Changing the role never re-provisions permissions.
    pub fn apply_patch(&mut self, patch: MembershipPatch, now: DateTime<Utc>) {
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
        self.updated_at = now;
    }
}

impl Entity for Membership {
    type Id = MembershipId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Membership {
    const TABLE: &'static str = "memberships";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Module;

    #[test]
    fn role_change_keeps_existing_permissions() {
        let mut m = Membership::provision(
            UserId::new(),
            EnterpriseId::new(),
            Role::Resident,
            PermissionMap::new(),
            NotificationMap::new(),
            Utc::now(),
        );

        m.apply_patch(
            MembershipPatch {
                role: Some(Role::Admin),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(m.role, Role::Admin);
        assert!(m.permissions.is_empty());
    }

    #[test]
    fn serializes_maps_with_module_keys() {
        let mut perms = PermissionMap::new();
        perms.set(Module::Tasks, PermissionLevel::ReadWrite);
        let m = Membership::provision(
            UserId::new(),
            EnterpriseId::new(),
            Role::Staff,
            perms,
            NotificationMap::new(),
            Utc::now(),
        );

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["permissions"]["tasks"], "READ_WRITE");
        assert_eq!(json["role"], "STAFF");
        assert!(json["notifications"].as_object().unwrap().is_empty());
    }

    #[test]
    fn missing_maps_deserialize_as_empty() {
        let m = Membership::provision(
            UserId::new(),
            EnterpriseId::new(),
            Role::Staff,
            PermissionMap::new(),
            NotificationMap::new(),
            Utc::now(),
        );
        let mut json = serde_json::to_value(&m).unwrap();
        let obj = json.as_object_mut().unwrap();
        obj.remove("permissions");
        obj.remove("notifications");

        let back: Membership = serde_json::from_value(json).unwrap();
        assert!(back.permissions.is_empty());
        assert!(back.notifications.is_empty());
    }
}
