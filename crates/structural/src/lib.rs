//! Structural issues reported by residents or staff, with photo references.
//!
//! Issues are owner-scoped: the reporter is the owner.

pub mod issue;
pub mod photo;

pub use issue::{
    IssueFilter, IssueId, IssuePatch, IssueSeverity, IssueStatus, NewIssue, StructuralIssue, sort_newest_first,
};
pub use photo::{IssuePhoto, PhotoId};
