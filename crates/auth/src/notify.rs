use crate::{Membership, Module};

/// Whether `membership` opted into notifications for `module`.
///
/// Independent of the permission level; absent keys mean "do not notify".
pub fn should_notify(module: Module, membership: &Membership) -> bool {
    membership.notifications.get(module).unwrap_or(false)
}
