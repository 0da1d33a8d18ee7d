//! Commit events and the post-commit hook pipeline.
//!
//! A gateway builds one [`CommitEvent`] per successful write and hands it to a
//! [`HookList`]. Hooks (audit logging, notifications) are best-effort: they
//! never fail or roll back the write that produced the event.

pub mod commit;
pub mod hooks;

pub use commit::{ActorRef, AuditAction, CommitEvent, NotificationTrigger};
pub use hooks::{DispatchMode, HookError, HookList, PostCommitHook};
