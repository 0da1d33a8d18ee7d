//! `condohub-auth`: identity, memberships and the permission evaluator.
//!
//! This crate is intentionally decoupled from HTTP and storage: it decides,
//! it never fetches.

pub mod authorize;
pub mod membership;
pub mod module;
pub mod notify;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{Action, Actor, Affordances, AuthzError, affordances, authorize, resolve};
pub use membership::{Membership, MembershipId, MembershipPatch, NotificationMap, PermissionMap};
pub use module::{Module, ModuleMap};
pub use notify::should_notify;
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::PermissionLevel;
pub use roles::Role;
pub use session::{Session, SessionError, SessionToken, validate_session};
pub use user::{NewUserAccount, UserAccount};
