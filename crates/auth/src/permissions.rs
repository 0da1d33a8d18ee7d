use serde::{Deserialize, Serialize};

/// Access tier for one module.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `None < ReadOnly < ReadWrite < FullAccess`.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    /// Module hidden entirely.
    #[default]
    None,
    /// View only.
    ReadOnly,
    /// Create, and edit own records.
    ReadWrite,
    /// Create/edit/delete any record, manage categories and attributes.
    FullAccess,
}

impl PermissionLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::None => "NONE",
            PermissionLevel::ReadOnly => "READ_ONLY",
            PermissionLevel::ReadWrite => "READ_WRITE",
            PermissionLevel::FullAccess => "FULL_ACCESS",
        }
    }

    /// Whether this level meets `required`.
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

impl core::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_totally_ordered() {
        assert!(PermissionLevel::None < PermissionLevel::ReadOnly);
        assert!(PermissionLevel::ReadOnly < PermissionLevel::ReadWrite);
        assert!(PermissionLevel::ReadWrite < PermissionLevel::FullAccess);
    }

    #[test]
    fn wire_names_are_screaming_snake_case() {
        let json = serde_json::to_string(&PermissionLevel::FullAccess).unwrap();
        assert_eq!(json, "\"FULL_ACCESS\"");
        let parsed: PermissionLevel = serde_json::from_str("\"READ_ONLY\"").unwrap();
        assert_eq!(parsed, PermissionLevel::ReadOnly);
    }
}
