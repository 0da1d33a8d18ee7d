use serde::{Deserialize, Serialize};

use crate::{ModuleMap, PermissionLevel};

/// Role of a user within one enterprise.
///
/// The role is descriptive: enforcement always goes through the membership's
/// permission map. `Admin` only matters when an account is provisioned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Resident,
    Staff,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Resident => "RESIDENT",
            Role::Staff => "STAFF",
        }
    }

    /// Permission map granted when a membership with this role is created.
    ///
    /// `Admin` receives FULL_ACCESS on every module; other roles keep the
    /// map requested by the provisioning administrator.
    pub fn provisioned_permissions(
        self,
        requested: ModuleMap<PermissionLevel>,
    ) -> ModuleMap<PermissionLevel> {
        match self {
            Role::Admin => ModuleMap::filled(PermissionLevel::FullAccess),
            Role::Resident | Role::Staff => requested,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
